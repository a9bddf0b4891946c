use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::ops::Deref;

use crate::auth::token::Claims;
use crate::error::AppError;

/// Extracts the verified token claims from request extensions.
///
/// Intended for routes wrapped by `AuthMiddleware`, which inserts the claims
/// after verifying the bearer token. Handlers pass these claims on to the
/// ownership guard; the extractor itself performs no authorization.
///
/// If no claims are present (the middleware did not run) the request fails
/// with `AppError::InvalidCredential`.
#[derive(Debug, Clone)]
pub struct AuthenticatedClaims(pub Claims);

impl Deref for AuthenticatedClaims {
    type Target = Claims;

    fn deref(&self) -> &Claims {
        &self.0
    }
}

impl FromRequest for AuthenticatedClaims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedClaims(claims))),
            None => {
                log::error!(
                    "no claims in request extensions for {}; is AuthMiddleware applied?",
                    req.path()
                );
                let err = AppError::InvalidCredential("missing bearer token".into());
                ready(Err(err.into()))
            }
        }
    }
}
