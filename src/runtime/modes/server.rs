//! Server mode
//!
//! 启动 HTTP 服务：签发端点、受 CSRF 保护的表单端点、健康检查。

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    http::Method,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::configure;
use crate::config::{CorsConfig, StaticConfig};
use crate::runtime::lifetime;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsConfig) {
    if !cors_config.enabled {
        return;
    }

    if cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");
    if is_any_origin && cors_config.allow_credentials {
        error!(
            "SECURITY WARNING: allow_any_origin + allow_credentials is a dangerous combination! \
            Disabling credentials."
        );
    }
}

/// Build CORS middleware from configuration
///
/// CSRF header 总是在允许列表中，否则跨域前端无法提交 token。
fn build_cors_middleware(cors_config: &CorsConfig, csrf_header: &str) -> Cors {
    // 未启用时使用浏览器默认的同源策略
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default();
    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");

    if is_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors = cors
        .allowed_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_header("Content-Type")
        .allowed_header("Accept")
        .allowed_header(csrf_header)
        .expose_headers(["x-request-id"])
        .max_age(cors_config.max_age as usize);

    // any_origin + credentials 会让 actix-cors 回显 Origin，强制关闭
    if cors_config.allow_credentials && !is_any_origin {
        cors = cors.supports_credentials();
    }

    cors
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: StaticConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            error!("Server startup failed: {:#}", e);
            e
        })?;

    let ctx = startup.app.clone();
    let cors_config = config.cors.clone();
    let csrf_header = config.csrf.header_name.clone();
    validate_cors_config(&cors_config);

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config, &csrf_header);
        let ctx = ctx.clone();

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .app_data(web::PayloadConfig::new(ctx.max_body_bytes))
            .configure(|cfg| configure(cfg, &ctx))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);
    let handle = server.handle();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res.context("HTTP server error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(startup.purge_task) => {
            handle.stop(true).await;
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::HttpResponse;

    const CSRF_HEADER: &str = "X-CSRF-Token";

    fn cors_config(origins: &[&str], allow_credentials: bool) -> CorsConfig {
        CorsConfig {
            enabled: true,
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            allow_credentials,
            ..CorsConfig::default()
        }
    }

    fn preflight(origin: &str) -> TestRequest {
        TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/contact")
            .insert_header(("Origin", origin))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .insert_header(("Access-Control-Request-Headers", "x-csrf-token, content-type"))
    }

    macro_rules! cors_app {
        ($config:expr) => {
            test::init_service(
                App::new()
                    .wrap(build_cors_middleware(&$config, CSRF_HEADER))
                    .route("/api/contact", web::post().to(HttpResponse::Created)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_preflight_allows_csrf_header() {
        let config = cors_config(&["https://app.example"], true);
        let app = cors_app!(config);

        let resp = test::call_service(&app, preflight("https://app.example").to_request()).await;
        assert!(resp.status().is_success());

        let allowed = resp
            .headers()
            .get("access-control-allow-headers")
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        assert!(allowed.contains("x-csrf-token"), "allow-headers: {}", allowed);
        assert_eq!(
            resp.headers().get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }

    #[actix_web::test]
    async fn test_custom_csrf_header_is_allowed() {
        let config = cors_config(&["https://app.example"], false);
        let app = test::init_service(
            App::new()
                .wrap(build_cors_middleware(&config, "X-Form-Guard"))
                .route("/api/contact", web::post().to(HttpResponse::Created)),
        )
        .await;

        let req = TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/contact")
            .insert_header(("Origin", "https://app.example"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .insert_header(("Access-Control-Request-Headers", "x-form-guard"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_preflight_from_unknown_origin_rejected() {
        let config = cors_config(&["https://app.example"], false);
        let app = cors_app!(config);

        let resp = test::call_service(&app, preflight("https://evil.example").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_any_origin_drops_credentials() {
        let config = cors_config(&["*"], true);
        let app = cors_app!(config);

        let resp = test::call_service(&app, preflight("https://anywhere.example").to_request()).await;
        assert!(resp.status().is_success());
        assert!(resp.headers().get("access-control-allow-credentials").is_none());

        let req = TestRequest::post()
            .uri("/api/contact")
            .insert_header(("Origin", "https://anywhere.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert!(resp.headers().get("access-control-allow-credentials").is_none());
    }
}
