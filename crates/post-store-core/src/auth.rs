//! Caller identity, passed explicitly into every mutating operation.
//!
//! Identity resolution itself is external (a token-verification service);
//! the coordinator only ever sees the resolved user id and role set and
//! never re-derives identity from request payloads.

/// The authenticated caller of a coordinator operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// User identifier from the authentication layer.
    pub user_id: String,
    /// Role/authority set granted to the caller.
    pub roles: Vec<String>,
}

impl Caller {
    /// Create a caller with no roles.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: Vec::new(),
        }
    }

    /// Create a caller with the given role set.
    #[must_use]
    pub fn with_roles(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles,
        }
    }

    /// Check whether the caller holds a role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
