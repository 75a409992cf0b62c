//! Middleware tests
//!
//! CsrfMiddleware 与 RequestIdMiddleware 的行为测试，使用最小化的 handler。

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::{Method, StatusCode};
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpMessage, HttpRequest, HttpResponse, web};
use chrono::{DateTime, Duration};
use std::sync::Arc;

use csrfgate::api::middleware::{CsrfMiddleware, RequestId, RequestIdMiddleware};
use csrfgate::config::{CsrfSettings, StaticConfig};
use csrfgate::csrf::{CsrfProtector, ManualClock, VerifiedToken, build_protector};

// =============================================================================
// Test Setup
// =============================================================================

const SECRET: &str = "middleware-test-secret-0123456789abcdef";

fn settings() -> CsrfSettings {
    CsrfSettings {
        secret: SECRET.to_string(),
        exclude_paths: vec!["/api/webhooks".to_string()],
        ..CsrfSettings::default()
    }
}

fn protector(clock: Arc<ManualClock>) -> Arc<dyn CsrfProtector> {
    build_protector(&settings(), clock).unwrap()
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        DateTime::from_timestamp(1_750_000_000, 0).unwrap(),
    ))
}

/// 回显 body，并报告是否拿到了 VerifiedToken
async fn echo_handler(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    let verified = req.extensions().get::<VerifiedToken>().is_some();
    HttpResponse::Ok()
        .insert_header(("X-Verified", verified.to_string()))
        .body(body)
}

async fn ok_handler() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

macro_rules! csrf_app {
    ($protector:expr) => {
        csrf_app!($protector, 64 * 1024)
    };
    ($protector:expr, $limit:expr) => {
        test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(CsrfMiddleware::new($protector, &settings(), $limit).unwrap())
                    .route("/echo", web::route().to(echo_handler))
                    .route("/webhooks/incoming", web::post().to(ok_handler)),
            ),
        )
        .await
    };
}

async fn json_code<B: MessageBody>(resp: ServiceResponse<B>) -> i64 {
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["code"].as_i64().unwrap()
}

// =============================================================================
// Pass-through rules
// =============================================================================

#[actix_web::test]
async fn test_safe_methods_pass_without_token() {
    let app = csrf_app!(protector(clock()));

    for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
        let req = TestRequest::default()
            .method(method.clone())
            .uri("/api/echo")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "method {}", method);
        assert_eq!(resp.headers().get("X-Verified").unwrap(), "false");
    }
}

#[actix_web::test]
async fn test_excluded_prefix_passes() {
    let app = csrf_app!(protector(clock()));

    let req = TestRequest::post()
        .uri("/api/webhooks/incoming")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_mutating_methods_require_token() {
    let app = csrf_app!(protector(clock()));

    for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
        let req = TestRequest::default()
            .method(method.clone())
            .uri("/api/echo")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "method {}", method);
    }
}

// =============================================================================
// Header transport
// =============================================================================

#[actix_web::test]
async fn test_missing_header_returns_missing_code() {
    let app = csrf_app!(protector(clock()));

    let req = TestRequest::post().uri("/api/echo").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_code(resp).await, 2000);
}

#[actix_web::test]
async fn test_valid_header_reaches_handler() {
    let protector = protector(clock());
    let token = protector.issue().value;
    let app = csrf_app!(protector);

    let req = TestRequest::post()
        .uri("/api/echo")
        .insert_header(("X-CSRF-Token", token))
        .set_payload("raw body")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Verified").unwrap(), "true");
    assert_eq!(test::read_body(resp).await, "raw body");
}

#[actix_web::test]
async fn test_tampered_header_returns_invalid_code() {
    let protector = protector(clock());
    let mut token = protector.issue().value;
    let last = token.pop().unwrap();
    token.push(if last == 'A' { 'B' } else { 'A' });
    let app = csrf_app!(protector);

    let req = TestRequest::post()
        .uri("/api/echo")
        .insert_header(("X-CSRF-Token", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 2003);
    // 错误信息不暴露 token 结构
    let message = body["message"].as_str().unwrap();
    assert_eq!(message, "CSRF token invalid");
}

#[actix_web::test]
async fn test_expired_header_returns_expired_code() {
    let clock = clock();
    let protector = protector(clock.clone());
    let token = protector.issue().value;
    let app = csrf_app!(protector);

    clock.advance(Duration::hours(1));

    let req = TestRequest::post()
        .uri("/api/echo")
        .insert_header(("X-CSRF-Token", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_code(resp).await, 2005);
}

// =============================================================================
// Body transport
// =============================================================================

#[actix_web::test]
async fn test_json_body_field_accepted_and_body_restored() {
    let protector = protector(clock());
    let token = protector.issue().value;
    let app = csrf_app!(protector);

    let payload = serde_json::json!({ "csrf_token": token, "email": "a@example.org" });
    let req = TestRequest::post()
        .uri("/api/echo")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Verified").unwrap(), "true");

    let echoed: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(echoed, payload);
}

#[actix_web::test]
async fn test_form_body_field_accepted_and_body_restored() {
    let protector = protector(clock());
    let token = protector.issue().value;
    let app = csrf_app!(protector);

    let form = vec![("email", "a@example.org".to_string()), ("csrf_token", token)];
    let expected = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();

    let req = TestRequest::post()
        .uri("/api/echo")
        .set_form(&form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, expected.as_bytes());
}

#[actix_web::test]
async fn test_blank_header_falls_back_to_body_field() {
    let protector = protector(clock());
    let token = protector.issue().value;
    let app = csrf_app!(protector);

    let req = TestRequest::post()
        .uri("/api/echo")
        .insert_header(("X-CSRF-Token", "  "))
        .set_json(serde_json::json!({ "csrf_token": token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Verified").unwrap(), "true");
}

#[actix_web::test]
async fn test_blank_header_without_body_is_missing() {
    let app = csrf_app!(protector(clock()));

    let req = TestRequest::post()
        .uri("/api/echo")
        .insert_header(("X-CSRF-Token", ""))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_code(resp).await, 2000);
}

#[actix_web::test]
async fn test_body_without_field_is_missing() {
    let app = csrf_app!(protector(clock()));

    let req = TestRequest::post()
        .uri("/api/echo")
        .set_json(serde_json::json!({ "email": "a@example.org" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_code(resp).await, 2000);
}

#[actix_web::test]
async fn test_plain_text_body_is_not_searched() {
    let protector = protector(clock());
    let token = protector.issue().value;
    let app = csrf_app!(protector);

    let req = TestRequest::post()
        .uri("/api/echo")
        .insert_header(("Content-Type", "text/plain"))
        .set_payload(format!("csrf_token={}", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_oversized_body_rejected() {
    let protector = protector(clock());
    let token = protector.issue().value;
    let app = csrf_app!(protector, 128);

    let req = TestRequest::post()
        .uri("/api/echo")
        .set_json(serde_json::json!({ "csrf_token": token, "padding": "x".repeat(256) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_code(resp).await, 1013);
}

#[actix_web::test]
async fn test_custom_header_and_field_names() {
    let mut custom = settings();
    custom.header_name = "X-Form-Guard".to_string();
    custom.field_name = "_guard".to_string();

    let protector = protector(clock());
    let app = test::init_service(
        App::new().service(
            web::scope("/api")
                .wrap(CsrfMiddleware::new(protector.clone(), &custom, 4096).unwrap())
                .route("/echo", web::post().to(echo_handler)),
        ),
    )
    .await;

    let req = TestRequest::post()
        .uri("/api/echo")
        .insert_header(("X-Form-Guard", protector.issue().value))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::post()
        .uri("/api/echo")
        .set_json(serde_json::json!({ "_guard": protector.issue().value }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // 默认名称不再生效
    let req = TestRequest::post()
        .uri("/api/echo")
        .insert_header(("X-CSRF-Token", protector.issue().value))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[test]
fn test_invalid_header_name_rejected() {
    let mut bad = settings();
    bad.header_name = "X CSRF".to_string();
    assert!(CsrfMiddleware::new(protector(clock()), &bad, 1024).is_err());
}

// =============================================================================
// Request ID
// =============================================================================

async fn request_id_handler(req: HttpRequest) -> HttpResponse {
    let id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    HttpResponse::Ok().body(id)
}

#[actix_web::test]
async fn test_request_id_generated_and_echoed() {
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .route("/", web::get().to(request_id_handler)),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    let header = resp
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(header.len(), 36);
    assert_eq!(test::read_body(resp).await, header.as_bytes());
}

#[actix_web::test]
async fn test_request_id_from_client_is_kept() {
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .route("/", web::get().to(request_id_handler)),
    )
    .await;

    let req = TestRequest::get()
        .uri("/")
        .insert_header(("X-Request-ID", "trace-abc_123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "trace-abc_123");
}

#[test]
fn test_default_config_protects_api_prefix() {
    let config = StaticConfig::default();
    assert_eq!(config.routes.api_prefix, "/api");
    assert!(config.csrf.exclude_paths.is_empty());
}
