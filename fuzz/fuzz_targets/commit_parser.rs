#![no_main]

use libfuzzer_sys::fuzz_target;
use radar_sig::commit::Commit;

fuzz_target!(|data: &[u8]| {
    // Any input is either a valid commit record or an error, never a panic
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = Commit::from_json_line(input);
    }
});
