//! Loader configuration
//!
//! Controls how strictly the stream directory is interpreted when an image is opened. The
//! table layout and all bounds checks are always enforced; these switches only cover the
//! places where real-world images are known to deviate from the format.

/// Configuration for [`crate::MetadataImage::open_with`]
///
/// # Examples
///
/// ```rust
/// use metascope::LoaderConfig;
///
/// let config = LoaderConfig::lenient();
/// assert!(!config.reject_unknown_streams);
/// assert!(config.trim_string_padding);
///
/// let custom = LoaderConfig {
///     reject_duplicate_streams: false,
///     ..LoaderConfig::default()
/// };
/// assert!(custom.reject_unknown_streams);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct LoaderConfig {
    /// Fail on stream names other than `#~`, `#Strings`, `#Blob`, `#GUID` and `#US`.
    /// When disabled, such streams are skipped with a warning.
    pub reject_unknown_streams: bool,

    /// Fail if a known stream name appears twice. When disabled, the first occurrence wins.
    pub reject_duplicate_streams: bool,

    /// Shrink the `#Strings` heap size past its trailing alignment padding, keeping at least
    /// one byte.
    pub trim_string_padding: bool,

    /// Fail if a stream's declared region extends past the image. When disabled, the region
    /// is clamped to the image end.
    pub reject_truncated_streams: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl LoaderConfig {
    /// Every check enabled; the default
    #[must_use]
    pub fn strict() -> Self {
        Self {
            reject_unknown_streams: true,
            reject_duplicate_streams: true,
            trim_string_padding: true,
            reject_truncated_streams: true,
        }
    }

    /// Tolerate unknown and duplicated streams and clamp truncated heaps
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            reject_unknown_streams: false,
            reject_duplicate_streams: false,
            trim_string_padding: true,
            reject_truncated_streams: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let strict = LoaderConfig::strict();
        assert!(strict.reject_unknown_streams);
        assert!(strict.reject_duplicate_streams);
        assert!(strict.trim_string_padding);
        assert!(strict.reject_truncated_streams);
        assert_eq!(LoaderConfig::default(), strict);

        let lenient = LoaderConfig::lenient();
        assert!(!lenient.reject_unknown_streams);
        assert!(!lenient.reject_duplicate_streams);
        assert!(lenient.trim_string_padding);
        assert!(!lenient.reject_truncated_streams);
    }
}
