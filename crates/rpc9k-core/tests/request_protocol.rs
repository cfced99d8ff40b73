#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rpc9k_core::protocol::{
    join_url, Action, Envelope, Json, Kind, Namespace, Procedure, Redirect, Request, Service,
};
use rpc9k_core::Rpc9kError;

#[test]
fn join_rules() {
    assert_eq!(join_url("/", "Example"), "/Example");
    assert_eq!(join_url("/Example/", "rpc"), "/Example/rpc");
    assert_eq!(join_url("/Example", "rpc/"), "/Example/rpc/");
    assert_eq!(join_url("/Example/", ""), "/Example/");
    assert_eq!(join_url("/a/b", "/c"), "/c");
    assert_eq!(join_url("http://h:80/a/b", "/c"), "http://h:80/c");
    assert_eq!(join_url("http://h:80", "c"), "http://h:80/c");
    assert_eq!(join_url("/a", "https://other/x"), "https://other/x");
}

#[test]
fn url_uses_own_base_over_current() {
    let req = Request::get("/root/").with_relative("child");
    assert_eq!(req.url("/ignored"), "/root/child");

    let req = Request::new(Action::Get).with_relative("child");
    assert_eq!(req.url("/current"), "/current/child");

    let req = Request::post("/Example/rpc");
    assert_eq!(req.url("/ignored"), "/Example/rpc");
}

#[test]
fn namespace_fetch_uses_override_and_embed() {
    let embedded: Envelope = Service::new(["rpc"]).into();
    let ns = Namespace::new(["Example", "Moved", "Inline"])
        .with_url("Moved", "/elsewhere/")
        .with_embed("Inline", embedded.clone());
    let env: Envelope = ns.into();

    let plain = env.fetch("Example", "/").unwrap();
    assert_eq!(plain.action, Action::Get);
    assert_eq!(plain.url("/"), "/Example");
    assert!(plain.cached.is_none());

    let moved = env.fetch("Moved", "/").unwrap();
    assert_eq!(moved.relative, "/elsewhere/");
    assert_eq!(moved.url("/"), "/elsewhere/");

    let inline = env.fetch("Inline", "/").unwrap();
    assert_eq!(inline.cached, Some(embedded));
}

#[test]
fn undeclared_name_is_an_error() {
    let env: Envelope = Namespace::new(["Example"]).into();
    let err = env.fetch("NoSuchName", "/").unwrap_err();
    assert!(matches!(&err, Rpc9kError::NoSuchRoute { kind: Kind::Namespace, .. }));
    assert!(err.to_string().contains("NoSuchName"));
}

#[test]
fn service_fetch_forwards_params() {
    let env: Envelope = Service::new(["rpc"]).with_param("tenant", "acme").into();
    let req = env.fetch("rpc", "/Example/").unwrap();
    assert_eq!(req.url("/"), "/Example/rpc");
    assert_eq!(req.params.get("tenant").map(String::as_str), Some("acme"));
}

#[test]
fn procedure_call_builds_post() {
    let env: Envelope = Procedure::new(["x", "y"]).with_param("v", "1").into();
    let args = Envelope::value(&[1, 2, 3]).unwrap();
    let req = env.call(args.clone(), "/Example/rpc").unwrap();

    assert_eq!(req.action, Action::Post);
    assert_eq!(req.relative, "");
    assert_eq!(req.url("/other"), "/Example/rpc");
    assert_eq!(req.params.get("v").map(String::as_str), Some("1"));
    assert_eq!(req.args, Some(args));
    assert!(req.cached.is_none());

    let body = req.body().unwrap().unwrap();
    let decoded: Vec<i64> = serde_json::from_slice(&body.value).unwrap();
    assert_eq!(decoded, vec![1, 2, 3]);
}

#[test]
fn procedure_with_result_is_cached() {
    let canned = Envelope::value(&"fixed").unwrap();
    let env: Envelope = Procedure::new(Vec::<String>::new())
        .with_result(canned.clone())
        .into();
    let req = env.call(Envelope::empty(), "/p").unwrap();
    assert_eq!(req.cached, Some(canned));
    assert!(req.body().unwrap().is_none());
}

#[test]
fn leaves_are_not_fetchable_or_callable() {
    let json: Envelope = Json::encode(&1).unwrap().into();
    assert!(matches!(
        json.fetch("x", "/"),
        Err(Rpc9kError::NotFetchable { kind: Kind::Json, .. })
    ));
    assert!(matches!(
        json.call(Envelope::empty(), "/"),
        Err(Rpc9kError::NotCallable(Kind::Json))
    ));

    let ns: Envelope = Namespace::new(["a"]).into();
    assert!(matches!(
        ns.call(Envelope::empty(), "/"),
        Err(Rpc9kError::NotCallable(Kind::Namespace))
    ));
    assert!(matches!(
        Envelope::empty().fetch("a", "/"),
        Err(Rpc9kError::NotFetchable { kind: Kind::Empty, .. })
    ));
}

#[test]
fn redirect_targets() {
    assert_eq!(Redirect::new("/Example/").url("/Example"), "/Example/");
    assert_eq!(Redirect::new("next").url("/a/b/"), "/a/b/next");
}
