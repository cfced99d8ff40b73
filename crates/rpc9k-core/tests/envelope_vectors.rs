//! Envelope decode vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use rpc9k_core::protocol::Envelope;

mod vector_loader;
use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn envelope_vectors() {
    let files = [
        "namespace_root.json",
        "namespace_null_maps.json",
        "service_embedded_procedure.json",
        "procedure_result.json",
        "json_payload.json",
        "blob_base64_frame.json",
        "redirect.json",
        "error.json",
        "empty.json",
        "unknown_kind.json",
        "missing_kind.json",
        "bad_payload.json",
        "unknown_embedded_kind.json",
    ];

    for f in files {
        let v = load(f);
        let raw = v.frame.decode();
        let res = Envelope::decode(&raw);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let env = res.expect("expected ok envelope");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(env.kind().as_str(), ex.kind, "vector={}", v.description);
        assert_eq!(env.routes(), ex.routes.as_slice(), "vector={}", v.description);

        // Whatever decodes must re-encode and decode to the same value.
        let again = Envelope::decode(&env.encode().unwrap()).unwrap();
        assert_eq!(again, env, "vector={}", v.description);
    }
}

#[test]
fn unknown_kind_names_the_tag() {
    let err = Envelope::decode_str(r#"{"Kind":"Future"}"#).unwrap_err();
    assert!(err.to_string().contains("Future"), "{err}");
}

#[test]
fn non_utf8_is_malformed() {
    let err = Envelope::decode(&[0xff, 0xfe, 0x00]).unwrap_err();
    assert_eq!(err.code().as_str(), "MALFORMED");
}
