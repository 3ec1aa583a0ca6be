//! Role Policies
//! Mission: Map named policies to the roles they admit, enforced by one middleware

use crate::auth::middleware::AuthError;
use crate::auth::models::{AuthenticatedAdmin, Role};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::fmt;
use tracing::warn;

/// Named authorization policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    RequireAdminRole,
    RequireEditorOrAdmin,
}

impl Policy {
    pub const ALL: [Policy; 2] = [Policy::RequireAdminRole, Policy::RequireEditorOrAdmin];

    pub fn name(&self) -> &'static str {
        match self {
            Policy::RequireAdminRole => "RequireAdminRole",
            Policy::RequireEditorOrAdmin => "RequireEditorOrAdmin",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Roles accepted by this policy
    pub fn required_roles(&self) -> &'static [Role] {
        match self {
            Policy::RequireAdminRole => &[Role::Admin],
            Policy::RequireEditorOrAdmin => &[Role::Admin, Role::Editor],
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.required_roles().contains(&role)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check a validated identity against a policy
pub fn authorize(policy: Policy, identity: Option<&AuthenticatedAdmin>) -> Result<(), AuthError> {
    let identity = identity.ok_or(AuthError::Unauthenticated)?;

    if policy.allows(identity.role) {
        Ok(())
    } else {
        warn!(
            email = %identity.email,
            role = %identity.role,
            policy = %policy,
            "Policy denied"
        );
        Err(AuthError::Forbidden)
    }
}

/// Policy middleware. Must run after `auth_middleware`:
/// `.route_layer(from_fn_with_state(Policy::RequireAdminRole, policy_middleware))`
pub async fn policy_middleware(
    State(policy): State<Policy>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(policy, req.extensions().get::<AuthenticatedAdmin>())?;
    Ok(next.run(req).await)
}
