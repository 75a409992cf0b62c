//! CSRF 防护中间件
//!
//! 状态变更请求在进入 handler 前必须携带本服务签发的有效 token：
//! 优先读取 header，header 缺失且 body 为 JSON / urlencoded 时读取 body 字段，
//! 读取后把完整 body 还原给 handler。
//!
//! 跳过规则：
//! - 安全方法（GET, HEAD, OPTIONS, TRACE）
//! - 配置的排除路径前缀

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    error::PayloadError,
    http::{Method, StatusCode, header::HeaderName},
    web::{Bytes, BytesMut},
};
use futures_util::StreamExt;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{trace, warn};

use crate::api::services::{ErrorCode, error_from_app, error_response};
use crate::config::CsrfSettings;
use crate::csrf::CsrfProtector;
use crate::errors::{AppError, Result};

/// 可携带 token 的 body 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
}

impl BodyKind {
    fn of(req: &ServiceRequest) -> Option<Self> {
        let mime = req.content_type();
        if mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json") {
            Some(Self::Json)
        } else if mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            Some(Self::Form)
        } else {
            None
        }
    }

    /// 字段不存在或 body 无法解析时返回 None，由 Guard 报告 MissingToken
    fn extract_field(self, body: &[u8], field: &str) -> Option<String> {
        match self {
            Self::Json => serde_json::from_slice::<serde_json::Value>(body)
                .ok()?
                .get(field)?
                .as_str()
                .map(str::to_owned),
            Self::Form => url::form_urlencoded::parse(body)
                .find(|(key, _)| key == field)
                .map(|(_, value)| value.into_owned()),
        }
    }
}

struct CsrfCheck {
    protector: Arc<dyn CsrfProtector>,
    header_name: HeaderName,
    field_name: String,
    exclude_paths: Vec<String>,
    body_limit: usize,
}

impl CsrfCheck {
    /// 前缀按路径段匹配：`/api/hooks` 排除 `/api/hooks/x`，不排除 `/api/hooksx`
    fn is_excluded(&self, path: &str) -> bool {
        self.exclude_paths.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    /// 空白 header 视为缺失，继续尝试 body 字段
    fn header_token(&self, req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get(&self.header_name)
            .and_then(|h| h.to_str().ok())
            .filter(|t| !t.trim().is_empty())
            .map(str::to_owned)
    }
}

/// CSRF 防护中间件
#[derive(Clone)]
pub struct CsrfMiddleware {
    check: Arc<CsrfCheck>,
}

impl CsrfMiddleware {
    pub fn new(
        protector: Arc<dyn CsrfProtector>,
        settings: &CsrfSettings,
        body_limit: usize,
    ) -> Result<Self> {
        let header_name = HeaderName::from_bytes(settings.header_name.as_bytes()).map_err(|_| {
            AppError::invalid_config(format!(
                "'{}' is not a valid HTTP header name",
                settings.header_name
            ))
        })?;

        Ok(Self {
            check: Arc::new(CsrfCheck {
                protector,
                header_name,
                field_name: settings.field_name.clone(),
                exclude_paths: settings.exclude_paths.clone(),
                body_limit,
            }),
        })
    }
}

impl<S, B> Transform<S, ServiceRequest> for CsrfMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CsrfMiddlewareService<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CsrfMiddlewareService {
            service: Rc::new(service),
            check: self.check.clone(),
        }))
    }
}

pub struct CsrfMiddlewareService<S> {
    service: Rc<S>,
    check: Arc<CsrfCheck>,
}

impl<S, B> CsrfMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    /// 检查是否是安全方法（不修改资源）
    fn is_safe_method(method: &Method) -> bool {
        matches!(
            method,
            &Method::GET | &Method::HEAD | &Method::OPTIONS | &Method::TRACE
        )
    }

    /// 读取完整 body，超过上限时返回 None
    async fn read_body(
        req: &mut ServiceRequest,
        limit: usize,
    ) -> std::result::Result<Option<Bytes>, Error> {
        let mut payload = req.take_payload();
        let mut body = BytesMut::new();
        while let Some(chunk) = payload.next().await {
            let chunk = chunk?;
            if body.len() + chunk.len() > limit {
                return Ok(None);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Some(body.freeze()))
    }

    /// 把已读取的 body 放回请求，handler 的 extractor 照常工作
    fn restore_body(req: &mut ServiceRequest, body: Bytes) {
        let stream = futures_util::stream::once(async move { Ok::<_, PayloadError>(body) });
        req.set_payload(Payload::Stream {
            payload: Box::pin(stream),
        });
    }
}

impl<S, B> Service<ServiceRequest> for CsrfMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let check = self.check.clone();

        Box::pin(async move {
            let mut req = req;

            // 1. 跳过安全方法
            if Self::is_safe_method(req.method()) {
                trace!("CSRF skipped: safe method {}", req.method());
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            // 2. 跳过排除路径
            if check.is_excluded(req.path()) {
                trace!("CSRF skipped: excluded path {}", req.path());
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            // 3. header 优先，其次 body 字段
            let token = match check.header_token(&req) {
                Some(token) => Some(token),
                None => match BodyKind::of(&req) {
                    Some(kind) => match Self::read_body(&mut req, check.body_limit).await? {
                        Some(body) => {
                            let token = kind.extract_field(&body, &check.field_name);
                            Self::restore_body(&mut req, body);
                            token
                        }
                        None => {
                            warn!("CSRF body exceeds {} bytes, rejecting", check.body_limit);
                            let response = error_response(
                                StatusCode::PAYLOAD_TOO_LARGE,
                                ErrorCode::PayloadTooLarge,
                                "Request body too large",
                            );
                            return Ok(req.into_response(response).map_into_right_body());
                        }
                    },
                    None => None,
                },
            };

            // 4. 校验
            match check.protector.verify(token.as_deref()) {
                Ok(verified) => {
                    trace!("CSRF validation passed");
                    req.extensions_mut().insert(verified);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(e) => {
                    warn!(
                        "CSRF validation failed: {} {} ({})",
                        req.method(),
                        req.path(),
                        e.kind()
                    );
                    let response = error_from_app(&AppError::from(e));
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
