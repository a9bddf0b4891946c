#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::{self, HeaderMap, HeaderName};
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use todo_api::auth::{AuthMiddleware, TokenVerifier};
use todo_api::repository::{InMemoryTaskRepository, TaskRepository};
use todo_api::routes::{self, health};
use todo_api::TaskService;

pub const SECRET: &str = "integration_test_secret";

/// Signs arbitrary claims with `secret` using `alg`.
pub fn sign(claims: &Value, secret: &str, alg: Algorithm) -> String {
    encode(
        &Header::new(alg),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to sign test token")
}

pub fn expires_in(hours: i64) -> i64 {
    (chrono::Utc::now() + chrono::Duration::hours(hours)).timestamp()
}

/// A valid token whose `userId` claim is `user_id`, the way the auth provider issues them.
pub fn token_for(user_id: i64) -> String {
    sign(
        &json!({ "userId": user_id.to_string(), "exp": expires_in(1) }),
        SECRET,
        Algorithm::HS256,
    )
}

pub fn bearer(token: &str) -> (HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// The service as `main` assembles it, minus CORS, on in-memory storage.
pub async fn init_app() -> impl Service<
    Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    init_app_with(Some(SECRET), Arc::new(InMemoryTaskRepository::new())).await
}

pub async fn init_app_with(
    secret: Option<&'static str>,
    repo: Arc<dyn TaskRepository>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    let verifier = Arc::new(TokenVerifier::new(secret));
    test::init_service(
        App::new()
            .app_data(web::Data::new(TaskService::new(repo)))
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(verifier))
                    .configure(routes::config),
            ),
    )
    .await
}

/// Status, headers and JSON body of a response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.body.clone())
            .unwrap_or_else(|e| panic!("unexpected body {}: {}", self.body, e))
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        })
    }
}

/// Sends `req` and turns middleware rejections into responses, as the HTTP
/// server would.
pub async fn send<S, B>(app: &S, req: Request) -> Reply
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = test::read_body(resp).await;
            Reply {
                status,
                headers,
                body: parse_body(&bytes),
            }
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = actix_web::body::to_bytes(resp.into_body())
                .await
                .expect("failed to read error body");
            Reply {
                status,
                headers,
                body: parse_body(&bytes),
            }
        }
    }
}
