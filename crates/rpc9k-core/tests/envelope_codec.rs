#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rpc9k_core::protocol::{
    Blob, Envelope, ErrorMessage, Json, Kind, KindRegistry, Message, Namespace, Procedure,
    Redirect, Service, Value, CONTENT_TYPE_ENVELOPE, CONTENT_TYPE_JSON,
};
use rpc9k_core::Rpc9kError;

fn round_trip(env: &Envelope) -> Envelope {
    let bytes = env.encode().unwrap();
    Envelope::decode(&bytes).unwrap()
}

#[test]
fn every_kind_round_trips() {
    let samples: Vec<Envelope> = vec![
        Namespace::new(["Example", "Other"])
            .with_url("Other", "elsewhere/")
            .with_embed("Example", Service::new(["rpc"]).into())
            .into(),
        Service::new(["rpc"]).with_param("tenant", "acme").into(),
        Procedure::new(["x", "y"])
            .with_result(Envelope::value(&42).unwrap())
            .into(),
        Json::encode(&vec![1, 2, 3]).unwrap().into(),
        Value::encode(&serde_json::json!({"a": [true, null]})).unwrap().into(),
        Blob::new("image/png", vec![0u8, 1, 2, 255]).into(),
        Redirect::new("/Example/").into(),
        ErrorMessage::new("denied", "no access").into(),
        Envelope::empty(),
    ];

    for env in &samples {
        let back = round_trip(env);
        assert_eq!(back.kind(), env.kind());
        assert_eq!(&back, env, "kind={}", env.kind());
    }
}

#[test]
fn kind_is_emitted_on_the_wire() {
    let env: Envelope = Redirect::new("/x").into();
    let v: serde_json::Value = serde_json::from_slice(&env.encode().unwrap()).unwrap();
    assert_eq!(v["Kind"], "Redirect");
    assert_eq!(v["Target"], "/x");

    let env: Envelope = Json::encode(&[1, 2]).unwrap().into();
    assert_eq!(env.to_json_string().unwrap(), r#"{"Kind":"JSON","Value":[1,2]}"#);
}

#[test]
fn empty_encodes_as_empty_kind_not_null() {
    let s = Envelope::empty().to_json_string().unwrap();
    assert_eq!(s, r#"{"Kind":"Empty"}"#);

    // a procedure without a result omits the field rather than writing null
    let env: Envelope = Procedure::new(["x"]).into();
    assert!(!env.to_json_string().unwrap().contains("null"));
}

#[test]
fn empty_is_canonical() {
    assert!(Envelope::default().is_empty());
    assert!(Message::Empty.wrap().is_empty());
    assert_eq!(Message::Empty.wrap(), Envelope::empty());
    assert_eq!(Envelope::decode_str(r#"{"Kind":"Empty"}"#).unwrap(), Envelope::empty());
    assert!(!Envelope::from(Namespace::new(["a"])).is_empty());
}

#[test]
fn custom_registry_accepts_registered_alias() {
    let raw = r#"{"Kind":"Module","Names":["Example"]}"#;
    assert!(matches!(
        Envelope::decode_str(raw),
        Err(Rpc9kError::UnknownKind(tag)) if tag == "Module"
    ));

    let mut registry = KindRegistry::new();
    registry.register("Module", rpc9k_core::protocol::kind::build::<Namespace>);
    assert!(registry.contains("Module"));

    let env = Envelope::decode_with(&registry, raw).unwrap();
    assert_eq!(env.kind(), Kind::Namespace);
    assert_eq!(env.routes().to_vec(), vec!["Example".to_string()]);
}

#[test]
fn custom_registry_applies_to_nested_envelopes() {
    let raw = r#"{"Kind":"Module","Names":["x"],"Embeds":{"x":{"Kind":"Module","Names":[]}}}"#;

    let mut registry = KindRegistry::new();
    registry.register("Module", rpc9k_core::protocol::kind::build::<Namespace>);

    let env = Envelope::decode_with(&registry, raw).unwrap();
    match env.message() {
        Some(Message::Namespace(ns)) => {
            assert_eq!(ns.embeds["x"], Envelope::from(Namespace::default()));
        }
        other => panic!("unexpected {other:?}"),
    }

    let canned = r#"{"Kind":"Procedure","Arguments":[],"Result":{"Kind":"Module","Names":["r"]}}"#;
    let env = Envelope::decode_with(&registry, canned).unwrap();
    let req = env.call(Envelope::empty(), "/p").unwrap();
    assert_eq!(req.cached.unwrap().routes().to_vec(), vec!["r".to_string()]);
    assert!(Envelope::decode_str(canned).is_err());
}

#[test]
fn nested_unknown_kind_keeps_its_code() {
    let embed = r#"{"Kind":"Service","Methods":["m"],"Embeds":{"m":{"Kind":"Nope"}}}"#;
    assert_eq!(
        Envelope::decode_str(embed),
        Err(Rpc9kError::UnknownKind("Nope".to_string()))
    );

    let result = r#"{"Kind":"Procedure","Result":{"Kind":"Nope"}}"#;
    assert_eq!(
        Envelope::decode_str(result),
        Err(Rpc9kError::UnknownKind("Nope".to_string()))
    );

    let malformed = r#"{"Kind":"Namespace","Embeds":{"x":{"Kind":"Redirect"}}}"#;
    assert!(matches!(
        Envelope::decode_str(malformed),
        Err(Rpc9kError::Malformed(_))
    ));
}

#[test]
fn envelope_nests_in_serde_types() {
    let raw = r#"{"reply":{"Kind":"Value","Value":[1,2]}}"#;

    #[derive(serde::Deserialize)]
    struct Wrapper {
        reply: Envelope,
    }

    let w: Wrapper = serde_json::from_str(raw).unwrap();
    assert_eq!(w.reply.scan::<Vec<u8>>().unwrap(), vec![1, 2]);
    assert!(serde_json::from_str::<Wrapper>(r#"{"reply":{"Kind":"Nope"}}"#).is_err());
}

#[test]
fn builtin_registry_covers_every_kind() {
    let registry = KindRegistry::builtin();
    for kind in Kind::ALL {
        assert!(registry.contains(kind.as_str()), "missing {kind}");
        assert_eq!(kind.as_str().parse::<Kind>().unwrap(), kind);
    }
    assert_eq!(registry.tags().len(), Kind::ALL.len());
}

#[test]
fn scan_by_kind() {
    let json: Envelope = Json::encode(&[1, 2, 3]).unwrap().into();
    assert_eq!(json.scan::<Vec<i64>>().unwrap(), vec![1, 2, 3]);

    let value = Envelope::value(&("a", 7)).unwrap();
    assert_eq!(value.scan::<(String, u8)>().unwrap(), ("a".to_string(), 7));

    let blob: Envelope = Blob::new("application/octet-stream", vec![9u8, 8]).into();
    assert_eq!(blob.scan::<Vec<u8>>().unwrap(), vec![9, 8]);

    let mismatch = value.scan::<Vec<i64>>().unwrap_err();
    assert!(matches!(mismatch, Rpc9kError::Scan(_)));

    let ns: Envelope = Namespace::new(["a"]).into();
    assert!(matches!(ns.scan::<i64>(), Err(Rpc9kError::NotScannable(Kind::Namespace))));

    let err: Envelope = ErrorMessage::new("boom", "it broke").into();
    assert!(matches!(
        err.scan::<i64>(),
        Err(Rpc9kError::Remote { id, .. }) if id == "boom"
    ));

    assert!(matches!(Envelope::empty().scan::<i64>(), Err(Rpc9kError::NothingToScan)));
}

#[test]
fn blob_conversion() {
    assert!(Envelope::empty().blob().unwrap().is_none());

    let value = Envelope::value(&[1, 2, 3]).unwrap().blob().unwrap().unwrap();
    assert_eq!(value.content_type, CONTENT_TYPE_JSON);
    assert_eq!(&value.value[..], b"[1,2,3]");

    let json: Envelope = Json::from_slice(br#"{"a":1}"#).unwrap().into();
    let blob = json.blob().unwrap().unwrap();
    assert_eq!(blob.content_type, CONTENT_TYPE_JSON);
    assert_eq!(&blob.value[..], br#"{"a":1}"#);

    let raw: Envelope = Blob::new("text/plain", "hi").into();
    assert_eq!(raw.blob().unwrap().unwrap(), Blob::new("text/plain", "hi"));

    let ns: Envelope = Namespace::new(["a"]).into();
    let blob = ns.blob().unwrap().unwrap();
    assert_eq!(blob.content_type, CONTENT_TYPE_ENVELOPE);
    assert!(blob.is_json());
    assert_eq!(Envelope::decode(&blob.value).unwrap(), ns);
}

#[test]
fn error_envelope_from_error() {
    let err = Rpc9kError::NoSuchRoute {
        kind: Kind::Namespace,
        name: "NoSuchName".into(),
    };
    let env = Envelope::from(&err);
    assert_eq!(env.kind(), Kind::Error);
    match env.message() {
        Some(Message::Error(m)) => {
            assert_eq!(m.id, "NO_SUCH_ROUTE");
            assert!(m.text.contains("NoSuchName"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn json_from_slice_rejects_garbage() {
    assert!(Json::from_slice(b"{not json").is_err());
}
