use crate::{
    auth::AuthenticatedClaims,
    error::AppError,
    models::{NewTask, TaskUpdate},
    service::TaskService,
};
use actix_web::{delete, get, patch, post, put, web, Error, HttpResponse, Responder};
use serde_json::Value;

// Handlers with a body take the extraction result instead of the body itself,
// so identifier and ownership failures are reported before body errors.

/// Creates a task for the user named in the path.
///
/// ## Request Body:
/// - `title`: required, 1 to 200 characters.
/// - `description` (optional): at most 1000 characters.
/// - `completed` (optional): defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: the user id is not a positive integer.
/// - `401 Unauthorized`: missing, invalid or expired token.
/// - `403 Forbidden`: the token belongs to another user.
/// - `422 Unprocessable Entity`: the body is unreadable or failed validation.
#[post("/{user_id}/tasks")]
pub async fn create_task(
    service: web::Data<TaskService>,
    path: web::Path<i64>,
    claims: AuthenticatedClaims,
    task_data: Result<web::Json<NewTask>, Error>,
) -> Result<impl Responder, Error> {
    let user_id = path.into_inner();
    service.admit_owner(&claims, user_id)?;

    let task = service
        .create(&claims, user_id, task_data?.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(task))
}

/// Lists every task of the user, newest first. Returns an empty array when
/// the user has none, and `403` when the token belongs to another user.
#[get("/{user_id}/tasks")]
pub async fn get_tasks(
    service: web::Data<TaskService>,
    path: web::Path<i64>,
    claims: AuthenticatedClaims,
) -> Result<impl Responder, AppError> {
    let tasks = service.list(&claims, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Fetches one task.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `404 Not Found`: the task does not exist or is owned by someone else.
#[get("/{user_id}/tasks/{task_id}")]
pub async fn get_task(
    service: web::Data<TaskService>,
    path: web::Path<(i64, i64)>,
    claims: AuthenticatedClaims,
) -> Result<impl Responder, AppError> {
    let (user_id, task_id) = path.into_inner();
    let task = service.get(&claims, user_id, task_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task. Only the fields present in the body change.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: the task does not exist or is owned by someone else.
/// - `422 Unprocessable Entity`: e.g. an empty title.
#[put("/{user_id}/tasks/{task_id}")]
pub async fn update_task(
    service: web::Data<TaskService>,
    path: web::Path<(i64, i64)>,
    claims: AuthenticatedClaims,
    task_data: Result<web::Json<TaskUpdate>, Error>,
) -> Result<impl Responder, Error> {
    let (user_id, task_id) = path.into_inner();
    service.admit_task(&claims, user_id, task_id)?;

    let task = service
        .update(&claims, user_id, task_id, task_data?.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task. Responds `204 No Content`, or `404` when the task does not
/// exist or is owned by someone else.
#[delete("/{user_id}/tasks/{task_id}")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    path: web::Path<(i64, i64)>,
    claims: AuthenticatedClaims,
) -> Result<impl Responder, AppError> {
    let (user_id, task_id) = path.into_inner();
    service.delete(&claims, user_id, task_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sets the completion flag.
///
/// The body is taken as raw JSON so that a missing or non-boolean
/// `completed` yields `422` with a specific message instead of being coerced.
#[patch("/{user_id}/tasks/{task_id}/complete")]
pub async fn complete_task(
    service: web::Data<TaskService>,
    path: web::Path<(i64, i64)>,
    claims: AuthenticatedClaims,
    body: Result<web::Json<Value>, Error>,
) -> Result<impl Responder, Error> {
    let (user_id, task_id) = path.into_inner();
    service.admit_task(&claims, user_id, task_id)?;

    let body = body?;
    let task = service
        .set_completion(&claims, user_id, task_id, &body)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}
