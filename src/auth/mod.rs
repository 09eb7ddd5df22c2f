//! Token based authentication: issuing tokens on log-in and gating protected routes.

mod middleware;
mod token;

pub use middleware::{AuthState, auth_guard};
pub use token::{Claims, TOKEN_DURATION, TokenKeys, issue_token, validate_token};
