//! Ownership checks applied before every task operation.
//!
//! The guard compares the identity asserted by a verified token with the owner
//! id taken from the request path. It runs on every call; nothing about a
//! previous decision is remembered.

use crate::auth::token::Claims;
use crate::error::AppError;

/// Rejects identifiers that are not positive integers.
///
/// `what` names the identifier in the error message, e.g. `"User ID"`.
pub fn require_positive_id(id: i64, what: &str) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::InvalidIdentifier(format!(
            "{} must be a positive integer",
            what
        )));
    }
    Ok(())
}

/// Checks that the caller identified by `claims` owns `path_owner_id`.
///
/// # Errors
/// - `AppError::InvalidIdentifier` if `path_owner_id` is not positive.
/// - `AppError::MissingSubject` if the claims carry no user id.
/// - `AppError::InvalidCredential` if the user id is not an integer.
/// - `AppError::OwnershipMismatch` if the ids differ.
pub fn authorize(path_owner_id: i64, claims: &Claims) -> Result<(), AppError> {
    require_positive_id(path_owner_id, "User ID")?;

    let subject = claims.subject()?;
    if subject != path_owner_id {
        log::warn!(
            "ownership mismatch: subject {} requested tasks of user {}",
            subject,
            path_owner_id
        );
        return Err(AppError::OwnershipMismatch);
    }

    Ok(())
}
