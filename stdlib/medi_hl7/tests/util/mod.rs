#![allow(dead_code)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a test logger once per test binary.
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    });
}

pub const ADT_A01: &str = "MSH|^~\\&|SRC|FAC|DST|HOSP|202501010101||ADT^A01|123|P|2.5\rPID|1|ALTID|P12345~P67890^^^MRN||Doe^Jane||19851224|F\r";

pub const ORU_R01: &str = "MSH|^~\\&|LAB|NORTH|EHR|HOSP|202501010101||ORU^R01|456|P|2.5\rPID|1||P12345||Roe^Rick\rOBX|1|NM|HR^Heart Rate||72|bpm|60-100|N||F\rOBX|2|NM|RR^Resp Rate||16|/min|12-20|N||F\r";
