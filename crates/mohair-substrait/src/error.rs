//! # Error Types
//!
//! Every fallible operation in this crate returns [`PlanError`]. The variants line
//! up with the places a plan can go wrong on its way through the crate:
//!
//! - **Resource**: a plan file could not be opened, read or written.
//! - **Decode**: bytes did not parse as a Substrait `Plan`.
//! - **Encode**: an in-memory `Plan` could not be written to the wire format.
//! - **RootResolution**: the plan's root marker is structurally broken.
//!
//! Errors are terminal for the operation that produced them; nothing is retried.

use std::io;
use std::path::PathBuf;

/// Structural defects in a plan's root marker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RootError {
    /// The relation list holds zero, or more than one, `RelRoot` entry.
    #[error("Found [{count}] root relations, expected exactly 1")]
    Count { count: usize },
    /// A caller-supplied root index is past the end of the relation list.
    #[error("Root index {index} is out of range for a plan with {relation_count} relations")]
    OutOfRange { index: usize, relation_count: usize },
    /// A caller-supplied root index points at a relation that is not a `RelRoot`.
    #[error("Relation {index} is not a root relation")]
    NotRoot { index: usize },
}

/// Errors returned by plan loading, validation and serialization.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Failed to access plan file {}: {source}", .path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse substrait plan: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("Failed to serialize substrait plan: {0}")]
    Encode(#[from] prost::EncodeError),
    #[error(transparent)]
    RootResolution(#[from] RootError),
    #[error("Failed to render plan as JSON: {0}")]
    Render(#[from] serde_json::Error),
}

impl PlanError {
    pub(crate) fn resource(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PlanError::Resource {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
