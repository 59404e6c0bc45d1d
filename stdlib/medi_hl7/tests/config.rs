#![cfg(feature = "serde")]

use medi_hl7::{Encoding, HeaderDefaults, Message, MessageConfig, TextEncoding, TrimScope};
use pretty_assertions::assert_eq;

#[test]
fn partial_config_falls_back_to_defaults() {
    let config: MessageConfig =
        serde_json::from_str(r#"{ "header_defaults": { "version": "2.8" } }"#).unwrap();
    assert_eq!(config.encoding, Encoding::default());
    assert_eq!(config.header_defaults.version, "2.8");
    assert_eq!(config.header_defaults.processing_id, "P");
    assert_eq!(config.header_defaults.security, None);
}

#[test]
fn config_round_trips_through_json() {
    let config = MessageConfig {
        encoding: Encoding {
            null_value: "NULL".into(),
            ..Encoding::default()
        },
        header_defaults: HeaderDefaults {
            processing_id: "T".into(),
            ..HeaderDefaults::default()
        },
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: MessageConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn configured_null_sentinel_is_used() {
    let config: MessageConfig =
        serde_json::from_str(r#"{ "encoding": { "null_value": "NULL" } }"#).unwrap();
    let mut msg = Message::from_config(config);
    msg.path("PID.3").put_null().unwrap();
    assert_eq!(msg.path("PID.3").value(), "NULL");
    assert!(msg.path("PID.3").is_null());
    msg.path("PID.4").put("\"\"").unwrap();
    assert!(!msg.path("PID.4").is_null());
}

#[test]
fn option_enums_deserialize() {
    let scope: TrimScope = serde_json::from_str(r#""components""#).unwrap();
    assert_eq!(scope, TrimScope::Components);
    let enc: TextEncoding = serde_json::from_str(r#""Latin1""#).unwrap();
    assert_eq!(enc, TextEncoding::Latin1);
}
