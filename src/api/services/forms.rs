//! 表单端点
//!
//! 两个端点都挂在 CSRF 中间件之后；`ReqData<VerifiedToken>` 缺失说明路由装配有误。

use actix_web::{Either, Responder, web};
use std::sync::Arc;
use tracing::debug;

use crate::csrf::VerifiedToken;
use crate::services::{ContactRequest, FormService, SubscribeRequest};

use super::helpers::{api_result, created_response};

type JsonOrForm<T> = Either<web::Json<T>, web::Form<T>>;

fn into_inner<T>(body: JsonOrForm<T>) -> T {
    match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    }
}

/// `POST {api_prefix}/contact`
pub async fn submit_contact(
    forms: web::Data<Arc<FormService>>,
    token: web::ReqData<VerifiedToken>,
    body: JsonOrForm<ContactRequest>,
) -> impl Responder {
    debug!("Contact form accepted with token issued at {}", token.issued_at);
    api_result(forms.submit_contact(into_inner(body)), created_response)
}

/// `POST {api_prefix}/subscribe`
pub async fn subscribe(
    forms: web::Data<Arc<FormService>>,
    token: web::ReqData<VerifiedToken>,
    body: JsonOrForm<SubscribeRequest>,
) -> impl Responder {
    debug!("Subscribe form accepted with token issued at {}", token.issued_at);
    api_result(forms.subscribe(into_inner(body)), created_response)
}
