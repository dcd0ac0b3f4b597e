#![no_main]

use libfuzzer_sys::fuzz_target;
use radar_sig::significance::RuleBook;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(rules) = RuleBook::from_toml_str(input) {
            // Routing a loaded book must not panic either
            let repos: Vec<String> = rules.repos().map(str::to_string).collect();
            for repo in &repos {
                let _ = rules.steps_for_metric(repo, "build/module/Init//instructions");
            }
        }
    }
});
