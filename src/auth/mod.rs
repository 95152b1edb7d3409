//! Caller identity: token verification and the two ways a handler learns
//! who is calling (callable invocation context, or an auth object attached
//! to an HTTP request by the auth layer).

mod context;
mod error;
mod middleware;
mod verifier;

pub use context::{AuthContext, AuthUser, CallableContext, Identity};
pub use error::AuthError;
pub use middleware::{attach_auth, bearer_token};
pub use verifier::{JwtVerifier, TokenVerifier};
