use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use todoforge::auth::{
    CookieSettings, PasswordHasher, TokenIssuer, AUTH_COOKIE, CSRF_COOKIE, CSRF_HEADER,
};
use todoforge::routes::{self, auth::AuthResponse, auth::CsrfResponse, health};
use todoforge::state::AppState;
use todoforge::store::MemoryStore;

const SECRET: &str = "integration_test_secret";

fn state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(TokenIssuer::new(SECRET)),
        PasswordHasher::new(4),
        CookieSettings {
            domain: Some("api.example.com".into()),
            secure: true,
        },
    ))
}

/// Any matching cookie/header pair passes the double-submit check.
const TEST_CSRF: &str = "integration-csrf-token";

fn with_csrf(req: test::TestRequest) -> test::TestRequest {
    req.cookie(Cookie::new(CSRF_COOKIE, TEST_CSRF))
        .insert_header((CSRF_HEADER, TEST_CSRF))
}

macro_rules! test_app {
    () => {{
        let state = state();
        test::init_service(
            App::new()
                .service(health::health)
                .configure(move |cfg| routes::config(cfg, state)),
        )
        .await
    }};
}

fn session_cookie(resp: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == AUTH_COOKIE)
        .map(Cookie::into_owned)
        .expect("response should set the session cookie")
}

#[test_log::test(actix_rt::test)]
async fn test_signup_login_and_session_flow() {
    let app = test_app!();

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "email": "a@x.io", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = test::read_body_json(resp).await;
    assert_eq!(user["email"], "a@x.io");
    assert!(user.get("password_hash").is_none());
    assert!(user.get("password").is_none());
    let user_id = user["id"].as_i64().unwrap();

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "a@x.io", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp);
    let body: AuthResponse = test::read_body_json(resp).await;
    assert_eq!(body.user_id as i64, user_id);
    assert_eq!(body.token, cookie.value());

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .cookie(cookie.clone())
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me, json!({ "id": user_id, "email": "a@x.io" }));

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/logout")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = session_cookie(&resp);
    assert_eq!(cleared.value(), "");
}

#[test_log::test(actix_rt::test)]
async fn test_login_cookie_attributes() {
    let app = test_app!();

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "email": "c@x.io", "password": "secret1" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "c@x.io", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);

    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.domain(), Some("api.example.com"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::None));

    let expires = cookie.expires_datetime().unwrap();
    let remaining = expires - actix_web::cookie::time::OffsetDateTime::now_utc();
    assert!(remaining > actix_web::cookie::time::Duration::hours(23));
    assert!(remaining <= actix_web::cookie::time::Duration::hours(24));
}

#[test_log::test(actix_rt::test)]
async fn test_duplicate_email_conflicts() {
    let app = test_app!();
    let payload = json!({ "email": "dup@x.io", "password": "secret1" });

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/signup")
        .set_json(&payload)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/signup")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Email already registered");
}

#[test_log::test(actix_rt::test)]
async fn test_bad_credentials_are_indistinguishable() {
    let app = test_app!();

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "email": "a@x.io", "password": "secret1" }))
        .to_request();
    test::call_service(&app, req).await;

    let mut bodies = Vec::new();
    for payload in [
        json!({ "email": "a@x.io", "password": "wrong-password" }),
        json!({ "email": "nobody@x.io", "password": "secret1" }),
    ] {
        let req = with_csrf(test::TestRequest::post())
            .uri("/api/v1/auth/login")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.response().cookies().next().is_none());
        bodies.push(test::read_body(resp).await);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[test_log::test(actix_rt::test)]
async fn test_signup_validation() {
    let app = test_app!();

    for payload in [
        json!({ "email": "not-an-email", "password": "secret1" }),
        json!({ "email": "a@x.io", "password": "short" }),
        json!({ "email": "a@x.io", "password": "x".repeat(73) }),
    ] {
        let req = with_csrf(test::TestRequest::post())
            .uri("/api/v1/auth/signup")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{}", payload);
    }

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/signup")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[test_log::test(actix_rt::test)]
async fn test_users_route_requires_session() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/api/v1/users").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .cookie(Cookie::new(AUTH_COOKIE, "garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[test_log::test(actix_rt::test)]
async fn test_delete_account_removes_user_and_tasks() {
    let app = test_app!();

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/signup")
        .set_json(json!({ "email": "gone@x.io", "password": "secret1" }))
        .to_request();
    test::call_service(&app, req).await;
    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "gone@x.io", "password": "secret1" }))
        .to_request();
    let cookie = session_cookie(&test::call_service(&app, req).await);

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/tasks")
        .cookie(cookie.clone())
        .set_json(json!({ "title": "orphan" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = with_csrf(test::TestRequest::delete())
        .uri("/api/v1/users")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(session_cookie(&resp).value(), "");

    // The token itself is still valid until it expires.
    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks")
        .cookie(cookie.clone())
        .to_request();
    let tasks: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks, json!([]));

    // The stale session can no longer write tasks.
    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/tasks")
        .cookie(cookie)
        .set_json(json!({ "title": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "User not found");

    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "gone@x.io", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[test_log::test(actix_rt::test)]
async fn test_health_is_public() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[test_log::test(actix_rt::test)]
async fn test_csrf_endpoint_issues_and_reuses_token() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/api/v1/auth/csrf").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == CSRF_COOKIE)
        .map(Cookie::into_owned)
        .expect("csrf endpoint should set its cookie");
    let body: CsrfResponse = test::read_body_json(resp).await;

    assert_eq!(body.csrf_token, cookie.value());
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.domain(), Some("api.example.com"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::None));

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/csrf")
        .cookie(cookie.clone())
        .to_request();
    let again: CsrfResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(again.csrf_token, body.csrf_token);

    // The issued pair unlocks state-changing requests.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .cookie(cookie)
        .insert_header((CSRF_HEADER, body.csrf_token))
        .set_json(json!({ "email": "csrf@x.io", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}

#[test_log::test(actix_rt::test)]
async fn test_state_changing_requests_need_csrf_pair() {
    let app = test_app!();
    let payload = json!({ "email": "a@x.io", "password": "secret1" });

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Missing CSRF token in request header");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .cookie(Cookie::new(CSRF_COOKIE, TEST_CSRF))
        .insert_header((CSRF_HEADER, "forged"))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid CSRF token");

    // Nothing was created by the rejected requests.
    let req = with_csrf(test::TestRequest::post())
        .uri("/api/v1/auth/signup")
        .set_json(&payload)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}
