/// Authorization rules for blog content
///
/// Reads are public. Creating needs a signed-in caller. Updating and deleting
/// need the caller to be the resource's author. Nothing here touches storage:
/// callers look the resource up first (so a missing resource is reported as
/// not found before any permission decision) and pass its owner in.
use crate::error::{AppError, Result};
use crate::models::UserIdentity;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Forbidden,
    Unauthenticated,
}

/// Decide whether `caller` may perform `action` on a resource owned by
/// `resource_owner` (`None` for actions without an existing resource).
pub fn authorize(
    caller: Option<&UserIdentity>,
    resource_owner: Option<Uuid>,
    action: Action,
) -> Decision {
    if action == Action::Read {
        return Decision::Allowed;
    }

    let Some(caller) = caller else {
        return Decision::Unauthenticated;
    };

    match action {
        Action::Read | Action::Create => Decision::Allowed,
        Action::Update | Action::Delete => match resource_owner {
            Some(owner) if owner == caller.id => Decision::Allowed,
            _ => Decision::Forbidden,
        },
    }
}

impl Decision {
    /// Turn a decision into the error a handler should return
    pub fn into_result(self, resource: &str) -> Result<()> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Forbidden => Err(AppError::Forbidden(format!(
                "You don't have permission to modify this {resource}"
            ))),
            Decision::Unauthenticated => Err(AppError::Unauthenticated(
                "Sign in required".to_string(),
            )),
        }
    }
}

/// The caller of a create action; anonymous requests are `Unauthenticated`
pub fn require_caller<'a>(
    caller: Option<&'a UserIdentity>,
    resource: &str,
) -> Result<&'a UserIdentity> {
    authorize(caller, None, Action::Create).into_result(resource)?;
    caller.ok_or_else(|| AppError::Unauthenticated("Sign in required".to_string()))
}

/// Only the author can update or delete a resource
pub fn check_ownership(
    caller: &UserIdentity,
    owner_id: Uuid,
    action: Action,
    resource: &str,
) -> Result<()> {
    authorize(Some(caller), Some(owner_id), action).into_result(resource)
}
