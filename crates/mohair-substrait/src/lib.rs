//! # mohair-substrait: Substrait Plan Messages
//!
//! This crate wraps the [Substrait](https://substrait.io/) query plan wire format so
//! callers can load, validate and re-emit a plan without handling the raw protobuf
//! schema themselves.
//!
//! ```text
//! plan file / bytes
//!   -> reader (decode into substrait::proto::Plan)
//!   -> root (find the single RelRoot)
//!   -> message::PlanMessage
//!   -> serialize / serialize_to_file
//!   -> plan file / bytes
//! ```
//!
//! ## Module Overview
//!
//! - **`message`**: `PlanMessage` and `SubstraitMessage`, the owning plan handle.
//! - **`root`**: root resolution over a plan's relation list.
//! - **`reader`**: decoding plans from bytes and files, plus file stream helpers.
//! - **`stringify`**: text and JSON renderings for diagnostics.
//! - **`config`**: immutable library configuration (version information).
//! - **`error`**: the `PlanError` type shared by every module.
//!
//! Only the structure of the root marker is validated. Column references, types and
//! the rest of the relational semantics are passed through untouched.

pub mod config;
pub mod error;
pub mod message;
pub mod reader;
pub mod root;
pub mod stringify;

pub use error::{PlanError, Result, RootError};
pub use message::{PlanMessage, SubstraitMessage};
pub use root::{find_plan_root, ROOT_SENTINEL};
