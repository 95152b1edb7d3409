use axum::http::Extensions;

/// A verified caller, as produced by a [`TokenVerifier`](super::TokenVerifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Invocation context handed to callable handlers. `auth` is `None` when the
/// caller sent no token.
#[derive(Debug, Clone, Default)]
pub struct CallableContext {
    pub auth: Option<AuthUser>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(String),
    Unauthenticated,
}

/// Transport-independent view of who is calling.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    user: Option<AuthUser>,
}

impl AuthContext {
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Identity pre-verified by the callable transport.
    pub fn from_callable(context: &CallableContext) -> Self {
        Self {
            user: context.auth.clone(),
        }
    }

    /// Identity attached to the request by [`attach_auth`](super::attach_auth).
    pub fn from_extensions(extensions: &Extensions) -> Self {
        Self {
            user: extensions.get::<AuthUser>().cloned(),
        }
    }

    pub fn identity(&self) -> Identity {
        match &self.user {
            Some(user) if !user.uid.trim().is_empty() => Identity::Authenticated(user.uid.clone()),
            _ => Identity::Unauthenticated,
        }
    }
}
