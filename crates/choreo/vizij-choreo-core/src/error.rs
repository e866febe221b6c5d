//! Error types for choreography authoring.
//!
//! Every error is raised at the offending call (node creation, grouping,
//! scheduling, config parsing). Sampling with `state_at` never fails.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ChoreoError {
    /// Reference to a node id that was never created
    #[error("Unknown node: {id}")]
    UnknownNode { id: NodeId },

    /// Grouping would make a group contain itself transitively
    #[error("Cyclic group: adding {child} to {group} would create a cycle")]
    CyclicGroup { group: NodeId, child: NodeId },

    /// A node may belong to one group at most
    #[error("Node {id} already belongs to group {parent}")]
    AlreadyParented { id: NodeId, parent: NodeId },

    /// Node names are unique within a scene
    #[error("Duplicate node name: {name}")]
    DuplicateName { name: String },

    /// Negative timing, empty or duplicated targets, non-group parents
    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    /// Verb-specific parameter missing or unusable
    #[error("Unsupported verb {verb}: {reason}")]
    UnsupportedVerb { verb: String, reason: String },

    /// Geometry or style rejected at creation time
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl ChoreoError {
    pub(crate) fn invalid_command(reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(verb: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedVerb {
            verb: verb.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownNode { .. }
            | Self::CyclicGroup { .. }
            | Self::AlreadyParented { .. }
            | Self::DuplicateName { .. }
            | Self::InvalidGeometry { .. } => "graph",
            Self::InvalidCommand { .. } | Self::UnsupportedVerb { .. } => "command",
            Self::InvalidConfig { .. } => "config",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for ChoreoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChoreoError>;
