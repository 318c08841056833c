//! Authentication and session management
//!
//! Users authenticate with a username/password pair. Local accounts are
//! verified against a stored bcrypt hash; `bcgsc` accounts are verified by
//! the external BCGSC authentication service. A successful login mints an
//! opaque bearer token whose sha256 digest is persisted in `user_tokens`
//! with a configurable TTL; the raw token is returned exactly once.
//!
//! Token validation rejects and prunes expired tokens, and extends the
//! expiry of tokens presented inside the renewal window.

pub mod external;
pub mod middleware;
pub mod models;
pub mod password;
pub mod routes;
pub mod session;
pub mod token;

pub use models::{AuthError, AuthUser};
pub use routes::session_routes;
