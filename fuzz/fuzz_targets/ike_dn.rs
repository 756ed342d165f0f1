#![no_main]

use libfuzzer_sys::fuzz_target;
use sridm_analyzer::ike_dn_to_cert_dn;

fuzz_target!(|data: &[u8]| {
    if let Ok(idi) = std::str::from_utf8(data) {
        let first = ike_dn_to_cert_dn(idi).ok();
        let second = ike_dn_to_cert_dn(idi).ok();
        assert_eq!(first, second);
    }
});
