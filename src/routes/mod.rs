pub mod health;
pub mod tasks;

use actix_web::web;

use crate::error::AppError;

/// Registers the task routes. Mount inside the `/api` scope, behind `AuthMiddleware`.
///
/// Path segments that are not integers become `400` and unreadable JSON
/// bodies become `422`, matching the rest of the error taxonomy.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::InvalidIdentifier(format!("path identifiers must be integers: {}", err)).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::InvalidPayload(err.to_string()).into()
    }))
    .service(tasks::get_tasks)
    .service(tasks::create_task)
    .service(tasks::get_task)
    .service(tasks::update_task)
    .service(tasks::delete_task)
    .service(tasks::complete_task);
}
