#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use shadowcue::config::ConfigLoader;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        let loader = ConfigLoader::with_defaults();
        if let Ok(loaded) = loader.load_str(yaml_str, Path::new("fuzz.yaml")) {
            // Every stored timing must already be inside its range.
            for level in shadowcue::catalog::Level::ALL {
                let profile = loaded.catalog.timings.get(level);
                for field in shadowcue::catalog::TimingField::ALL {
                    assert!(field.range().contains(profile.get(field)));
                }
            }
        }
    }
});
