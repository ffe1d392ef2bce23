//! Attribute flag sets of the browsed tables (ECMA-335 II.23.1).
//!
//! The `*_props` queries return raw flag words; these types give them names. Multi-bit fields
//! such as visibility and member access are not single flags, so they are exposed through masks
//! and `from_bits_retain` keeps every bit of the raw value.

use bitflags::bitflags;

bitflags! {
    /// `TypeDef.Flags`
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TypeAttributes: u32 {
        /// Visibility mask
        const VISIBILITY_MASK = 0x0000_0007;
        /// Class is public scope
        const PUBLIC = 0x0000_0001;
        /// Nested class with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Nested class with private visibility
        const NESTED_PRIVATE = 0x0000_0003;
        /// Nested class with family visibility
        const NESTED_FAMILY = 0x0000_0004;
        /// Nested class with assembly visibility
        const NESTED_ASSEMBLY = 0x0000_0005;
        /// Nested class with family and assembly visibility
        const NESTED_FAM_AND_ASSEM = 0x0000_0006;
        /// Nested class with family or assembly visibility
        const NESTED_FAM_OR_ASSEM = 0x0000_0007;
        /// Layout mask
        const LAYOUT_MASK = 0x0000_0018;
        /// Fields laid out sequentially
        const SEQUENTIAL_LAYOUT = 0x0000_0008;
        /// Layout supplied explicitly
        const EXPLICIT_LAYOUT = 0x0000_0010;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Class is abstract
        const ABSTRACT = 0x0000_0080;
        /// Class cannot be extended
        const SEALED = 0x0000_0100;
        /// Class name is special
        const SPECIAL_NAME = 0x0000_0400;
        /// Class is imported
        const IMPORT = 0x0000_1000;
        /// Class is serializable
        const SERIALIZABLE = 0x0000_2000;
        /// String format mask
        const STRING_FORMAT_MASK = 0x0003_0000;
        /// LPSTR is interpreted as UNICODE
        const UNICODE_CLASS = 0x0001_0000;
        /// LPSTR is interpreted automatically
        const AUTO_CLASS = 0x0002_0000;
        /// Initialize the class before the first static field access
        const BEFORE_FIELD_INIT = 0x0010_0000;
        /// The runtime should check the name encoding
        const RT_SPECIAL_NAME = 0x0000_0800;
        /// Class has security associated with it
        const HAS_SECURITY = 0x0004_0000;
    }
}

impl TypeAttributes {
    /// The visibility field, 0 meaning not public
    #[must_use]
    pub fn visibility(self) -> u32 {
        self.bits() & Self::VISIBILITY_MASK.bits()
    }

    /// True for any of the nested visibilities
    #[must_use]
    pub fn is_nested(self) -> bool {
        self.visibility() >= Self::NESTED_PUBLIC.bits()
    }
}

bitflags! {
    /// `MethodDef.Flags`
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MethodAttributes: u16 {
        /// Member access mask
        const MEMBER_ACCESS_MASK = 0x0007;
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible by anyone in the assembly
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessible by sub-types anywhere, plus anyone in the assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method may not be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name and signature, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new vtable slot
        const NEW_SLOT = 0x0100;
        /// Method can only be overridden if also accessible
        const STRICT = 0x0200;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// Implementation is forwarded through PInvoke
        const PINVOKE_IMPL = 0x2000;
        /// Reserved: shall be zero for conforming implementations
        const UNMANAGED_EXPORT = 0x0008;
        /// The runtime should check the name encoding
        const RT_SPECIAL_NAME = 0x1000;
        /// Method has security associated with it
        const HAS_SECURITY = 0x4000;
        /// Method calls another method containing security code
        const REQUIRE_SEC_OBJECT = 0x8000;
    }
}

impl MethodAttributes {
    /// The member access field, 0 meaning compiler controlled
    #[must_use]
    pub fn access(self) -> u16 {
        self.bits() & Self::MEMBER_ACCESS_MASK.bits()
    }
}

bitflags! {
    /// `MethodDef.ImplFlags`
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MethodImplAttributes: u16 {
        /// Code type mask; 0 is IL
        const CODE_TYPE_MASK = 0x0003;
        /// Method implementation is native
        const NATIVE = 0x0001;
        /// Reserved
        const OPTIL = 0x0002;
        /// Method implementation is provided by the runtime
        const RUNTIME = 0x0003;
        /// Method implementation is unmanaged
        const UNMANAGED = 0x0004;
        /// Method cannot be inlined
        const NO_INLINING = 0x0008;
        /// Method is defined; used primarily in merge scenarios
        const FORWARD_REF = 0x0010;
        /// Method is single threaded through the body
        const SYNCHRONIZED = 0x0020;
        /// Method will not be optimized when generating native code
        const NO_OPTIMIZATION = 0x0040;
        /// Method signature is exported exactly as declared
        const PRESERVE_SIG = 0x0080;
        /// Method should be inlined if possible
        const AGGRESSIVE_INLINING = 0x0100;
        /// Reserved for internal use
        const INTERNAL_CALL = 0x1000;
    }
}

bitflags! {
    /// `Field.Flags`
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FieldAttributes: u16 {
        /// Field access mask
        const FIELD_ACCESS_MASK = 0x0007;
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible by anyone in the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessible by sub-types anywhere, plus anyone in the assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Field can only be initialized, not written to after init
        const INIT_ONLY = 0x0020;
        /// Value is a compile time constant
        const LITERAL = 0x0040;
        /// Reserved
        const NOT_SERIALIZED = 0x0080;
        /// Field is special
        const SPECIAL_NAME = 0x0200;
        /// Implementation is forwarded through PInvoke
        const PINVOKE_IMPL = 0x2000;
        /// The runtime should check the name encoding
        const RT_SPECIAL_NAME = 0x0400;
        /// Field has marshalling information
        const HAS_FIELD_MARSHAL = 0x1000;
        /// Field has a default value
        const HAS_DEFAULT = 0x8000;
        /// Field has an RVA
        const HAS_FIELD_RVA = 0x0100;
    }
}

impl FieldAttributes {
    /// The field access field, 0 meaning compiler controlled
    #[must_use]
    pub fn access(self) -> u16 {
        self.bits() & Self::FIELD_ACCESS_MASK.bits()
    }
}

bitflags! {
    /// `Param.Flags`
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ParamAttributes: u16 {
        /// Param is `[In]`
        const IN = 0x0001;
        /// Param is `[out]`
        const OUT = 0x0002;
        /// Param is optional
        const OPTIONAL = 0x0010;
        /// Param has a default value
        const HAS_DEFAULT = 0x1000;
        /// Param has marshalling information
        const HAS_FIELD_MARSHAL = 0x2000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_visibility() {
        let public_sealed = TypeAttributes::from_bits_retain(0x0010_0101);
        assert_eq!(public_sealed.visibility(), 1);
        assert!(!public_sealed.is_nested());
        assert!(public_sealed.contains(TypeAttributes::SEALED));
        assert!(public_sealed.contains(TypeAttributes::BEFORE_FIELD_INIT));

        let nested = TypeAttributes::from_bits_retain(0x0000_0003);
        assert!(nested.is_nested());
    }

    #[test]
    fn member_access() {
        let method = MethodAttributes::from_bits_retain(0x0096);
        assert_eq!(method.access(), 6);
        assert!(method.contains(MethodAttributes::STATIC | MethodAttributes::HIDE_BY_SIG));
        assert!(!method.contains(MethodAttributes::VIRTUAL));

        let field = FieldAttributes::from_bits_retain(0x8051);
        assert_eq!(field.access(), 1);
        assert!(field.contains(FieldAttributes::LITERAL | FieldAttributes::HAS_DEFAULT));
    }

    #[test]
    fn retain_unknown_bits() {
        let params = ParamAttributes::from_bits_retain(0x1003 | 0x0100);
        assert_eq!(params.bits(), 0x1103);
        assert!(params.contains(ParamAttributes::IN | ParamAttributes::OUT));
    }
}
