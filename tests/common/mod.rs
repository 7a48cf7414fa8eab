#![allow(dead_code)]

// Shared helpers for integration tests.
//
// These helpers use `tower_cookies::Cookie` parsing/encoding to match what
// the middleware emits in `Set-Cookie` and what browsers send back in
// `Cookie`.
use std::{convert::Infallible, sync::Arc};

use axum::body::Body;
use http::{HeaderMap, Request, Response, header};
use http_body_util::BodyExt as _;
use tower_cookies::{Cookie, Key};
use tower_kv_sessions::{
    Codec as _, KeyRing, MemoryBackend, Session, SessionConfig, SessionManagerLayer, SessionStore,
};

pub struct TestApp {
    pub backend: Arc<MemoryBackend>,
    pub ring: KeyRing,
    pub layer: SessionManagerLayer,
}

pub fn make_layer(config: SessionConfig) -> TestApp {
    // A memory-backed store with a single signing key. The ring is returned
    // so tests can unsign cookie values and inspect backend records.
    let backend = Arc::new(MemoryBackend::new());
    let ring = KeyRing::new(Key::generate());
    let store = SessionStore::new(backend.clone(), Arc::new(ring.clone())).with_config(config);

    TestApp {
        backend,
        ring,
        layer: SessionManagerLayer::new(store),
    }
}

pub async fn body_string(body: Body) -> String {
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub async fn handler(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    // Basic handler used by many tests: write a single key into the session.
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .expect("request includes Session extension");

    session.insert("foo", 42).expect("session insert succeeds");

    Ok(Response::new(Body::empty()))
}

pub async fn noop_handler(_: Request<Body>) -> Result<Response<Body>, Infallible> {
    // Handler that does not access the session at all.
    Ok(Response::new(Body::empty()))
}

pub fn get_session_cookie(res: &Response<Body>) -> Cookie<'static> {
    get_session_cookie_from_headers(res.headers())
}

pub fn get_session_cookie_from_headers(headers: &HeaderMap) -> Cookie<'static> {
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("response includes set-cookie header");
    let set_cookie = set_cookie
        .to_str()
        .expect("set-cookie header is valid utf-8");
    Cookie::parse_encoded(set_cookie)
        .expect("set-cookie parses successfully")
        .into_owned()
}

pub fn cookie_header_value(cookie: &Cookie<'_>) -> String {
    cookie.encoded().to_string()
}

pub fn session_id(app: &TestApp, cookie: &Cookie<'_>, name: &str) -> String {
    // Unsign a session cookie back to the raw session id.
    app.ring
        .decode(name, cookie.value())
        .expect("session cookie verifies")
}

pub fn sign_id(app: &TestApp, name: &str, id: &str) -> String {
    // Sign an arbitrary id the way the store would, for forged-cookie tests.
    app.ring.encode(name, id).expect("id signs successfully")
}
