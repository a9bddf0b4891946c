use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenVerifier;
use crate::error::AppError;

/// Verifies the bearer token on every request it wraps and stores the
/// resulting [`Claims`](crate::auth::Claims) in the request extensions.
///
/// Requests without a valid token are answered with the matching `AppError`
/// and never reach the handler.
#[derive(Clone)]
pub struct AuthMiddleware {
    verifier: Arc<TokenVerifier>,
}

impl AuthMiddleware {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            verifier: Arc::clone(&self.verifier),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    verifier: Arc<TokenVerifier>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = bearer_token(&req).and_then(|token| self.verifier.verify(token));

        match outcome {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(app_err) => {
                log::warn!("rejected {} {}: {}", req.method(), req.path(), app_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(req: &ServiceRequest) -> Result<&str, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::InvalidCredential("missing bearer token".into()))?
        .to_str()
        .map_err(|_| AppError::InvalidCredential("unreadable authorization header".into()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AppError::InvalidCredential("malformed authorization header".into()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::InvalidCredential(
            "invalid authentication scheme".into(),
        ));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::InvalidCredential("missing bearer token".into()));
    }
    Ok(token)
}
