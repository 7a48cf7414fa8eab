mod common;

use axum::{Router, body::Body, routing::get};
use http::{Request, header};
use tower::ServiceExt as _;
use tower_cookies::Cookie;
use tower_kv_sessions::{Session, SessionConfig};

fn routes() -> Router {
    Router::new()
        .route(
            "/set-user",
            get(|session: Session| async move {
                session.insert("user", "alice").expect("session insert succeeds");
            }),
        )
        .route(
            "/get-user",
            get(|session: Session| async move {
                session
                    .get::<String>("user")
                    .expect("session get succeeds")
                    .unwrap_or_else(|| "none".to_string())
            }),
        )
}

fn tamper_cookie_value(cookie: &mut Cookie<'_>) {
    let mut value = cookie.value().to_string();
    let last = value
        .pop()
        .expect("cookie value has at least one character");
    let replacement = if last == 'A' { 'B' } else { 'A' };
    value.push(replacement);
    cookie.set_value(value);
}

#[tokio::test]
async fn tampered_cookie_is_rejected() {
    let app = common::make_layer(SessionConfig::default());
    let router = routes().layer(app.layer);

    let req = Request::builder()
        .uri("/set-user")
        .body(Body::empty())
        .expect("request builds successfully");
    let res = router
        .clone()
        .oneshot(req)
        .await
        .expect("service call succeeds");
    let mut session_cookie = common::get_session_cookie(&res);

    tamper_cookie_value(&mut session_cookie);

    let req = Request::builder()
        .uri("/get-user")
        .header(header::COOKIE, common::cookie_header_value(&session_cookie))
        .body(Body::empty())
        .expect("request builds successfully");
    let res = router.oneshot(req).await.expect("service call succeeds");

    assert_eq!(common::body_string(res.into_body()).await, "none");
}

#[tokio::test]
async fn tampered_cookie_still_yields_a_usable_session() {
    // After tampering, a write must land in a brand new session under a
    // freshly minted id, never the original one.
    let app = common::make_layer(SessionConfig::default());
    let router = routes().layer(app.layer.clone());

    let req = Request::builder()
        .uri("/set-user")
        .body(Body::empty())
        .expect("request builds successfully");
    let res = router
        .clone()
        .oneshot(req)
        .await
        .expect("service call succeeds");
    let original_cookie = common::get_session_cookie(&res);
    let original_id = common::session_id(&app, &original_cookie, "id");

    let mut tampered = original_cookie.clone();
    tamper_cookie_value(&mut tampered);

    let req = Request::builder()
        .uri("/set-user")
        .header(header::COOKIE, common::cookie_header_value(&tampered))
        .body(Body::empty())
        .expect("request builds successfully");
    let res = router.oneshot(req).await.expect("service call succeeds");

    let new_cookie = common::get_session_cookie(&res);
    let new_id = common::session_id(&app, &new_cookie, "id");
    assert_ne!(new_id, original_id);
    assert_eq!(app.backend.len(), 2);
}
