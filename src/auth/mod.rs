//! Bearer-token authentication and per-request ownership enforcement.
//!
//! Tokens are issued by an external auth provider; this module only verifies
//! them ([`TokenVerifier`]) and checks the asserted identity against the owner
//! named in the request path ([`authorize`]).

pub mod extractors;
pub mod guard;
pub mod middleware;
pub mod token;

pub use extractors::AuthenticatedClaims;
pub use guard::{authorize, require_positive_id};
pub use middleware::AuthMiddleware;
pub use token::{Claims, SubjectId, TokenVerifier};
