#![no_main]

use libfuzzer_sys::fuzz_target;
use metascope::{LoaderConfig, MetadataImage};

fuzz_target!(|data: &[u8]| {
    let Ok(image) = MetadataImage::open_with(data, LoaderConfig::lenient()) else {
        return;
    };

    for ty in image.enum_type_definitions() {
        let _ = image.type_def_props(ty);
        if let Ok(methods) = image.enum_methods_of(ty) {
            for method in methods {
                let _ = image.method_def_props(method);
                if let Ok(params) = image.enum_params_of(method) {
                    params.for_each(|param| {
                        let _ = image.param_def_props(param);
                    });
                }
            }
        }
        if let Ok(fields) = image.enum_fields_of(ty) {
            fields.for_each(|field| {
                let _ = image.field_def_props(field);
            });
        }
    }
});
