//! Report lifecycle: status vocabulary, the pure action transition table,
//! and the append-only audit entry type.
//!
//! This module is authorization-free on purpose -- role checks live at the
//! API boundary so the transition table can be tested in isolation.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Action name constants
// ---------------------------------------------------------------------------

/// Recognized action names. Audit entries may record any free-form action
/// string; only these ones change the report status.
pub mod actions {
    /// Implicit action recorded when a report is created.
    pub const UPLOADED: &str = "uploaded";
    /// Authorities were notified (SMS) about the report.
    pub const NOTIFY_AUTHORITY: &str = "notify_authority";
    pub const DISPATCH_DRONE: &str = "dispatch_drone";
    pub const INSPECTION_DONE: &str = "inspection_done";
    pub const SCHEDULE_REPAIR: &str = "schedule_repair";
    pub const REPAIR_DONE: &str = "repair_done";
    /// Informational ping to the reporting citizen; no status change.
    pub const NOTIFY_CITIZEN: &str = "notify_citizen";
}

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Main workflow status of a report. `Pending` is initial, `Resolved` is
/// terminal; reports are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Reported,
    Inspected,
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Reported => "Reported",
            Self::Inspected => "Inspected",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "Pending" => Ok(Self::Pending),
            "Reported" => Ok(Self::Reported),
            "Inspected" => Ok(Self::Inspected),
            "In Progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            other => Err(CoreError::Validation(format!(
                "Unknown report status '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auxiliary drone-tracking tag shown alongside the main status.
///
/// Fully derived: one explicit mapping from the main status, never stored
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroneStatus {
    Unassigned,
    InProgress,
    Completed,
}

impl DroneStatus {
    /// Derive the drone tag accompanying a main status.
    pub fn for_status(status: ReportStatus) -> Self {
        match status {
            ReportStatus::InProgress => Self::InProgress,
            ReportStatus::Resolved => Self::Completed,
            ReportStatus::Pending | ReportStatus::Reported | ReportStatus::Inspected => {
                Self::Unassigned
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Result of applying one named action to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    pub next_status: ReportStatus,
    pub drone_status: DroneStatus,
    /// Whether the action name was in the recognized set.
    pub recognized: bool,
}

/// Apply a named action to the current status.
///
/// Unrecognized actions leave the status unchanged -- a policy choice, not an
/// error -- and the caller still appends an audit entry for them. Exactly one
/// audit entry accompanies every applied action.
pub fn apply_action(current: ReportStatus, action: &str) -> ActionOutcome {
    let (next_status, recognized) = match action {
        actions::NOTIFY_AUTHORITY => (ReportStatus::Reported, true),
        actions::DISPATCH_DRONE | actions::INSPECTION_DONE => (ReportStatus::Inspected, true),
        actions::SCHEDULE_REPAIR => (ReportStatus::InProgress, true),
        actions::REPAIR_DONE => (ReportStatus::Resolved, true),
        actions::NOTIFY_CITIZEN => (current, true),
        _ => (current, false),
    };

    ActionOutcome {
        next_status,
        drone_status: DroneStatus::for_status(next_status),
        recognized,
    }
}

// ---------------------------------------------------------------------------
// Audit entries
// ---------------------------------------------------------------------------

/// One immutable fact in a report's history, stored as a JSONB array element.
///
/// Insertion order is the audit trail's temporal order; entries are never
/// reordered or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: Timestamp,
}

impl AuditEntry {
    /// Build an entry for `action` stamped with the current UTC time.
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            actor_id: None,
            actor_role: None,
            notes: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the authenticated actor who performed the action.
    pub fn with_actor(mut self, actor_id: DbId, actor_role: &str) -> Self {
        self.actor_id = Some(actor_id);
        self.actor_role = Some(actor_role.to_string());
        self
    }

    /// Attach a free-text note.
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }
}
