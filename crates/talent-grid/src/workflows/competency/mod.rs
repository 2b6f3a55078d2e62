//! Competency management workflows: versioned frameworks per job title and
//! the seniority assessments scored against them.

pub mod access;
pub mod assessments;
pub mod audit;
pub mod frameworks;

pub use access::{Actor, ActorRole};
pub use audit::{AuditAction, AuditEntry, AuditError, AuditLogWriter};
