use serde::{Deserialize, Serialize};

use super::frameworks::domain::UserId;

/// Roles recognized by the competency services. Mirrors the platform's role
/// table; session handling itself lives outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    SystemOwner,
    WorkspaceAdmin,
    Leader,
    Member,
}

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: ActorRole,
}

impl Actor {
    pub fn is_system_owner(&self) -> bool {
        self.role == ActorRole::SystemOwner
    }

    pub fn can_administer(&self) -> bool {
        matches!(self.role, ActorRole::SystemOwner | ActorRole::WorkspaceAdmin)
    }

    pub fn can_calibrate(&self) -> bool {
        matches!(
            self.role,
            ActorRole::SystemOwner | ActorRole::WorkspaceAdmin | ActorRole::Leader
        )
    }
}

/// Uniform authorization failure. The message is identical for every denied
/// operation regardless of resource state, so responses do not reveal whether
/// the target exists.
#[derive(Debug, thiserror::Error)]
#[error("not authorized")]
pub struct AccessError;

pub fn require_system_owner(actor: &Actor) -> Result<(), AccessError> {
    if actor.is_system_owner() {
        Ok(())
    } else {
        Err(AccessError)
    }
}

pub fn require_administrator(actor: &Actor) -> Result<(), AccessError> {
    if actor.can_administer() {
        Ok(())
    } else {
        Err(AccessError)
    }
}

pub fn require_calibrator(actor: &Actor) -> Result<(), AccessError> {
    if actor.can_calibrate() {
        Ok(())
    } else {
        Err(AccessError)
    }
}
