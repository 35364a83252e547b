//! # Plan Reader (Deserialization)
//!
//! Turns protobuf bytes, or a file holding them, into an owned Substrait `Plan`.
//! This is the ingestion side of the crate:
//!
//! ```text
//! plan file / bytes
//!   -> reader::plan_from_file() / reader::plan_from_bytes()
//!   -> substrait::proto::Plan
//!   -> SubstraitMessage (root unresolved)
//! ```
//!
//! A decode failure never yields a partially populated plan: the caller gets a
//! `PlanError` and nothing else. File handles are scoped to the call that opened
//! them and are closed on every return path.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read};
use std::path::Path;

use prost::Message;
use substrait::proto;

use crate::error::{PlanError, Result};

/// Open `path` for binary reading.
pub fn input_stream_for_file(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    File::open(path).map_err(|e| {
        tracing::error!(path = %path.display(), "Failed to open input stream for file: {e}");
        PlanError::resource(path, e)
    })
}

/// Open `path` for binary writing, creating it or truncating existing contents.
pub fn output_stream_for_file(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| {
            tracing::error!(path = %path.display(), "Failed to open output stream for file: {e}");
            PlanError::resource(path, e)
        })
}

/// Read the whole file at `path` into memory.
///
/// The read is checked against the size reported by the file's metadata, so a
/// file that shrinks mid-read is reported instead of silently truncated.
pub fn file_to_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let file = input_stream_for_file(path)?;

    let expected = file
        .metadata()
        .map_err(|e| read_failure(path, e))?
        .len() as usize;
    tracing::debug!(path = %path.display(), size = expected, "reading plan file");

    let mut file_data = Vec::with_capacity(expected);
    BufReader::new(file)
        .read_to_end(&mut file_data)
        .map_err(|e| read_failure(path, e))?;

    if file_data.len() < expected {
        let short_read = std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("read {} of {} bytes", file_data.len(), expected),
        );
        tracing::error!(path = %path.display(), "{short_read}");
        return Err(PlanError::resource(path, short_read));
    }

    Ok(file_data)
}

fn read_failure(path: &Path, e: std::io::Error) -> PlanError {
    tracing::error!(path = %path.display(), "Failed to read plan file: {e}");
    PlanError::resource(path, e)
}

/// Decode a Substrait plan from its protobuf encoding.
pub fn plan_from_bytes(plan_msg: &[u8]) -> Result<proto::Plan> {
    let plan = proto::Plan::decode(plan_msg).map_err(|e| {
        tracing::error!("Failed to parse substrait plan: {e}");
        PlanError::Decode(e)
    })?;

    tracing::debug!(
        bytes = plan_msg.len(),
        relations = plan.relations.len(),
        "decoded substrait plan"
    );
    tracing::trace!(?plan, "decoded plan contents");
    Ok(plan)
}

/// Decode a Substrait plan from the file at `path`.
pub fn plan_from_file(path: impl AsRef<Path>) -> Result<proto::Plan> {
    let plan_data = file_to_bytes(path.as_ref())?;
    plan_from_bytes(&plan_data)
}
