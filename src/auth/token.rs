use std::collections::HashSet;

use crate::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// A user identifier as it appears inside a token.
///
/// Auth providers disagree on whether ids are JSON numbers or strings, so both
/// are accepted and normalised by [`SubjectId::as_user_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    Numeric(i64),
    Text(String),
}

impl SubjectId {
    /// Zero and empty strings count as absent so that lookup falls through to
    /// the next claim.
    fn is_blank(&self) -> bool {
        match self {
            SubjectId::Numeric(id) => *id == 0,
            SubjectId::Text(text) => text.trim().is_empty(),
        }
    }

    /// Parses the identifier as an integer user id.
    pub fn as_user_id(&self) -> Result<i64, AppError> {
        match self {
            SubjectId::Numeric(id) => Ok(*id),
            SubjectId::Text(text) => text.trim().parse().map_err(|_| {
                AppError::InvalidCredential(format!("subject {:?} is not a numeric user id", text))
            }),
        }
    }
}

/// Claims decoded from a verified bearer token.
///
/// The caller's identity lives under `userId` or, failing that, the standard
/// `sub` claim. Any other claims the provider adds are ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Provider-specific user id claim, checked first.
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<SubjectId>,
    /// Standard subject claim, used when `userId` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<SubjectId>,
    /// Expiration timestamp (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl Claims {
    /// Resolves the caller's user id: `userId` first, then `sub`.
    ///
    /// Returns `AppError::MissingSubject` when neither claim carries a value and
    /// `AppError::InvalidCredential` when the value is not an integer.
    pub fn subject(&self) -> Result<i64, AppError> {
        let raw = self
            .user_id
            .as_ref()
            .filter(|id| !id.is_blank())
            .or_else(|| self.sub.as_ref().filter(|id| !id.is_blank()))
            .ok_or(AppError::MissingSubject)?;
        raw.as_user_id()
    }
}

/// Verifies bearer tokens against the shared secret of the auth provider.
///
/// Tokens must be signed with HS256. Verification is a pure function of the
/// token and the configured secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Builds a verifier. With no secret every call to [`verify`](Self::verify)
    /// fails with `AppError::Configuration`.
    pub fn new(secret: Option<&str>) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        // Provider tokens may omit `exp`; it is still enforced when present.
        validation.required_spec_claims = HashSet::new();

        Self {
            key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    /// Decodes and validates `token`, returning its claims unchanged.
    ///
    /// # Errors
    /// - `AppError::Configuration` if no secret is configured.
    /// - `AppError::ExpiredCredential` if `exp` has passed.
    /// - `AppError::InvalidCredential` for malformed tokens, bad signatures or
    ///   a signing algorithm other than HS256.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| AppError::Configuration("auth secret not set".into()))?;

        let data = decode::<Claims>(token, key, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("configured", &self.is_configured())
            .finish()
    }
}
