use medi_hl7::{Message, TextEncoding, TrimScope};
use proptest::prelude::*;

fn segment_name() -> impl Strategy<Value = String> {
    prop_oneof![Just("PID".to_string()), Just("OBX".to_string()), "Z[A-Z0-9]{2}"]
}

/// Paths below segment level, in every supported shape.
fn element_path() -> impl Strategy<Value = String> {
    (
        segment_name(),
        1usize..4,
        1usize..12,
        prop::option::of(1usize..4),
        prop::option::of(1usize..6),
        prop::option::of(1usize..4),
    )
        .prop_map(|(seg, occ, field, rep, comp, sub)| {
            let mut path = seg;
            if occ > 1 {
                path.push_str(&format!("({occ})"));
            }
            path.push_str(&format!(".{field}"));
            if let Some(rep) = rep {
                path.push_str(&format!("({rep})"));
            }
            if let Some(comp) = comp {
                path.push_str(&format!(".{comp}"));
                if let Some(sub) = sub {
                    path.push_str(&format!(".{sub}"));
                }
            }
            path
        })
}

fn plain_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .-]{1,12}"
}

proptest! {
    #[test]
    fn absent_paths_read_as_defaults(path in element_path()) {
        let mut msg = Message::new();
        let pv = msg.path(path);
        prop_assert!(!pv.exists());
        prop_assert!(!pv.has_value());
        prop_assert!(!pv.is_null());
        prop_assert_eq!(pv.value(), "");
    }

    #[test]
    fn put_then_read_back(path in element_path(), value in plain_value()) {
        let mut msg = Message::new();
        msg.path(path.clone()).put(&value).unwrap();
        let pv = msg.path(path);
        prop_assert_eq!(pv.value(), value);
        prop_assert!(pv.exists());
        prop_assert!(pv.has_value());
        prop_assert!(!pv.is_null());
    }

    #[test]
    fn put_null_reads_as_null(path in element_path()) {
        let mut msg = Message::new();
        msg.path(path.clone()).put_null().unwrap();
        let pv = msg.path(path);
        prop_assert!(pv.is_null());
        prop_assert_eq!(pv.value(), "\"\"");
        prop_assert!(!pv.has_value());
    }

    #[test]
    fn set_on_absent_path_fails_where_put_succeeds(path in element_path(), value in plain_value()) {
        let mut msg = Message::new();
        prop_assert!(msg.path(path.clone()).set(&value).unwrap_err().is_not_found());
        prop_assert!(msg.path(path).put(&value).is_ok());
    }

    #[test]
    fn bytes_are_the_encoded_text(
        writes in prop::collection::vec((element_path(), plain_value()), 1..6),
        trim in prop::option::of(prop_oneof![
            Just(TrimScope::All),
            Just(TrimScope::Fields),
            Just(TrimScope::Components),
        ]),
        encoding in prop_oneof![
            Just(TextEncoding::Utf8),
            Just(TextEncoding::Latin1),
            Just(TextEncoding::Ascii),
        ],
    ) {
        let mut msg = Message::new();
        for (path, value) in &writes {
            msg.path(path.clone()).put(value).unwrap();
        }
        let mut pipeline = msg.serialize().with_encoding(encoding);
        if let Some(scope) = trim {
            pipeline = pipeline.without_trailing_delimiters_in(scope);
        }
        let text = pipeline.to_text().unwrap();
        prop_assert_eq!(pipeline.to_bytes().unwrap(), encoding.encode(&text).unwrap());
    }
}
