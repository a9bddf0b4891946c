#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "A per-user to-do list backend. Every task operation verifies the caller's"]
#![doc = "bearer token, checks that the token's subject owns the user id in the path,"]
#![doc = "and only then touches owner-scoped storage. The binary (`main.rs`) wires"]
#![doc = "these pieces into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

pub use config::Config;
pub use error::AppError;
pub use service::TaskService;
