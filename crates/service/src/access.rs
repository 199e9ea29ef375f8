//! Ownership-scoped visibility.
//!
//! Every scheduling and support handler asks one question: may this caller
//! act on this record? The answer is derived from a [`Scope`], and list
//! queries are filtered by the very same scope, so a record shows up in a
//! collection exactly when it can be fetched on its own.
//!
//! A denied record is reported as not found, never as forbidden.

use models::user::Role;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Resolved, authenticated requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(id: Uuid, role: Role) -> Self { Self { id, role } }

    pub fn is_staff(&self) -> bool { self.role == Role::Staff }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Appointment,
    SupportTicket,
    SupportMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// Rows a caller may see or touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    OwnedBy(Uuid),
}

impl Scope {
    pub fn permits(&self, owner: Uuid) -> bool {
        match self {
            Scope::All => true,
            Scope::OwnedBy(id) => *id == owner,
        }
    }

    /// Owner filter for a list query; `None` means unfiltered.
    pub fn owner_filter(&self) -> Option<Uuid> {
        match self {
            Scope::All => None,
            Scope::OwnedBy(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    NotFound,
    Unauthenticated,
}

impl Access {
    pub fn into_result(self, entity: &str) -> Result<(), ServiceError> {
        match self {
            Access::Allowed => Ok(()),
            Access::NotFound => Err(ServiceError::not_found(entity)),
            Access::Unauthenticated => Err(ServiceError::Unauthenticated),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    restrict_message_mutation: bool,
}

impl AccessPolicy {
    pub fn new(cfg: &configs::AccessConfig) -> Self {
        Self { restrict_message_mutation: cfg.restrict_message_mutation }
    }

    /// Role that sees every record of `resource`, if any.
    fn elevated_role(resource: Resource) -> Role {
        match resource {
            Resource::Appointment => Role::Professional,
            Resource::SupportTicket | Resource::SupportMessage => Role::Staff,
        }
    }

    /// Collection scope, or `None` for an anonymous caller.
    pub fn scope(&self, caller: Option<&Caller>, resource: Resource, op: Operation) -> Option<Scope> {
        let caller = caller?;
        if caller.role == Self::elevated_role(resource) {
            return Some(Scope::All);
        }
        let scope = match (resource, op) {
            // 消息对所有已登录用户可读
            (Resource::SupportMessage, Operation::Read) => Scope::All,
            (Resource::SupportMessage, Operation::Write) if !self.restrict_message_mutation => Scope::All,
            _ => Scope::OwnedBy(caller.id),
        };
        Some(scope)
    }

    /// Per-record decision. `owner` is `None` when the record does not exist.
    pub fn check(&self, caller: Option<&Caller>, resource: Resource, op: Operation, owner: Option<Uuid>) -> Access {
        let Some(scope) = self.scope(caller, resource, op) else {
            return Access::Unauthenticated;
        };
        match owner {
            Some(owner) if scope.permits(owner) => Access::Allowed,
            Some(owner) => {
                debug!(?resource, ?op, %owner, caller = ?caller.map(|c| c.id), "record outside caller scope");
                Access::NotFound
            }
            None => Access::NotFound,
        }
    }

    /// Creation needs an authenticated caller only; the owner is always the caller.
    pub fn check_create(&self, caller: Option<&Caller>) -> Access {
        if caller.is_some() { Access::Allowed } else { Access::Unauthenticated }
    }
}

/// Caller or 401.
pub fn require(caller: Option<&Caller>) -> Result<&Caller, ServiceError> {
    caller.ok_or(ServiceError::Unauthenticated)
}
