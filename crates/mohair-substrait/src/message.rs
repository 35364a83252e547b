//! # Plan Messages
//!
//! A plan message owns one parsed query plan together with the index of its root
//! relation. It is the handle the rest of the system passes around instead of raw
//! protobuf structs.
//!
//! ## Variants
//!
//! [`PlanMessage`] is a closed enum. Each variant owns its own payload type and
//! implements the same surface: serialize to bytes, serialize to a file, and
//! expose the resolved root. Only the Substrait variant exists today.
//!
//! ## Root State
//!
//! The root is stored as an index, never as a reference into the payload. The
//! relation itself is looked up on demand from `(payload, index)`, and anything
//! that can change the payload drops the stored index. A stored index always
//! points at a `RelRoot` entry of the payload currently owned.
//!
//! ## Loading
//!
//! `from_bytes` and `from_file` decode a plan and wrap it with the root
//! unresolved. Callers that need the root call `resolve_root` afterwards.

use std::io::Write;
use std::path::Path;

use prost::Message;
use substrait::proto;

use crate::error::{PlanError, Result};
use crate::reader;
use crate::root::{self, ROOT_SENTINEL};

/// A Substrait plan held in memory, plus its resolved root index.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstraitMessage {
    payload: proto::Plan,
    root: Option<usize>,
}

impl SubstraitMessage {
    /// Wrap `plan` without resolving its root.
    pub fn new(plan: proto::Plan) -> Self {
        Self {
            payload: plan,
            root: None,
        }
    }

    /// Wrap `plan` with a caller-supplied root index.
    ///
    /// The index is checked against the payload: it must be in range and tagged as a
    /// `RelRoot`. A bad index is an error, not a message with a broken root.
    pub fn with_root(plan: proto::Plan, root_relndx: usize) -> Result<Self> {
        let root = root::validate_root_index(&plan, root_relndx).inspect_err(|err| {
            tracing::error!("{err}");
        })?;
        Ok(Self {
            payload: plan,
            root: Some(root),
        })
    }

    /// Wrap `plan` and resolve its root with a full scan.
    pub fn resolved(plan: proto::Plan) -> Result<Self> {
        let mut message = Self::new(plan);
        message.resolve_root()?;
        Ok(message)
    }

    /// Decode a plan from protobuf bytes. The root is left unresolved.
    pub fn from_bytes(plan_msg: &[u8]) -> Result<Self> {
        reader::plan_from_bytes(plan_msg).map(Self::new)
    }

    /// Decode a plan from a file. The root is left unresolved.
    pub fn from_file(plan_fpath: impl AsRef<Path>) -> Result<Self> {
        reader::plan_from_file(plan_fpath).map(Self::new)
    }

    /// Run the root resolver over the payload and remember the result.
    ///
    /// On failure the stored root is cleared, so a stale index never survives a
    /// failed resolution.
    pub fn resolve_root(&mut self) -> Result<usize> {
        match root::find_plan_root(&self.payload) {
            Ok(ndx) => {
                self.root = Some(ndx);
                Ok(ndx)
            }
            Err(err) => {
                self.root = None;
                Err(err.into())
            }
        }
    }

    pub fn root_index(&self) -> Option<usize> {
        self.root
    }

    /// The root index in sentinel form: `-1` when unresolved.
    pub fn root_relndx(&self) -> i64 {
        self.root.map_or(ROOT_SENTINEL, |ndx| ndx as i64)
    }

    /// The root relation, looked up from the stored index.
    pub fn root_relation(&self) -> Option<&proto::PlanRel> {
        self.root
            .and_then(|ndx| self.payload.relations.get(ndx))
            .filter(|plan_rel| root::is_root(plan_rel))
    }

    /// The `RelRoot` body of the root relation.
    pub fn rel_root(&self) -> Option<&proto::RelRoot> {
        match self.root_relation()?.rel_type.as_ref()? {
            proto::plan_rel::RelType::Root(rel_root) => Some(rel_root),
            proto::plan_rel::RelType::Rel(_) => None,
        }
    }

    pub fn payload(&self) -> &proto::Plan {
        &self.payload
    }

    /// Mutable access to the payload. Drops the resolved root.
    pub fn payload_mut(&mut self) -> &mut proto::Plan {
        self.root = None;
        &mut self.payload
    }

    /// Swap in a new payload, returning the old one. Drops the resolved root.
    pub fn replace_payload(&mut self, plan: proto::Plan) -> proto::Plan {
        self.root = None;
        std::mem::replace(&mut self.payload, plan)
    }

    pub fn into_payload(self) -> proto::Plan {
        self.payload
    }

    pub fn relation_count(&self) -> usize {
        self.payload.relations.len()
    }

    /// Encode the payload into its canonical protobuf bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut msg_serialized = Vec::with_capacity(self.payload.encoded_len());
        self.payload.encode(&mut msg_serialized).map_err(|e| {
            tracing::error!("Error when serializing substrait message: {e}");
            PlanError::Encode(e)
        })?;
        Ok(msg_serialized)
    }

    /// Encode the payload and write it to `out_fpath`.
    ///
    /// The plan is encoded in full before the file is touched. If the write fails
    /// a partial regular file is removed; its contents must not be trusted either way.
    /// Anything else the path names (a symlink target, a device) is left in place.
    pub fn serialize_to_file(&self, out_fpath: impl AsRef<Path>) -> Result<()> {
        let out_fpath = out_fpath.as_ref();
        let msg_serialized = self.serialize()?;

        let mut file_stream = reader::output_stream_for_file(out_fpath)?;
        let written = file_stream
            .write_all(&msg_serialized)
            .and_then(|_| file_stream.flush());

        if let Err(e) = written {
            tracing::error!(path = %out_fpath.display(), "Unable to write substrait message to file: {e}");
            let wrote_regular_file = file_stream.metadata().is_ok_and(|m| m.is_file());
            let is_symlink = std::fs::symlink_metadata(out_fpath)
                .is_ok_and(|m| m.file_type().is_symlink());
            drop(file_stream);
            if wrote_regular_file && !is_symlink {
                let _ = std::fs::remove_file(out_fpath);
            }
            return Err(PlanError::resource(out_fpath, e));
        }
        drop(file_stream);

        tracing::debug!(
            path = %out_fpath.display(),
            bytes = msg_serialized.len(),
            "wrote substrait plan"
        );
        Ok(())
    }
}

/// A query plan held in memory, independent of which wire format produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanMessage {
    Substrait(SubstraitMessage),
}

impl PlanMessage {
    /// Load a Substrait plan from `plan_fpath`, root unresolved.
    pub fn substrait_from_file(plan_fpath: impl AsRef<Path>) -> Result<Self> {
        SubstraitMessage::from_file(plan_fpath).map(PlanMessage::Substrait)
    }

    /// Decode a Substrait plan from bytes, root unresolved.
    pub fn substrait_from_bytes(plan_msg: &[u8]) -> Result<Self> {
        SubstraitMessage::from_bytes(plan_msg).map(PlanMessage::Substrait)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        match self {
            PlanMessage::Substrait(msg) => msg.serialize(),
        }
    }

    pub fn serialize_to_file(&self, out_fpath: impl AsRef<Path>) -> Result<()> {
        match self {
            PlanMessage::Substrait(msg) => msg.serialize_to_file(out_fpath),
        }
    }

    pub fn resolve_root(&mut self) -> Result<usize> {
        match self {
            PlanMessage::Substrait(msg) => msg.resolve_root(),
        }
    }

    pub fn root_index(&self) -> Option<usize> {
        match self {
            PlanMessage::Substrait(msg) => msg.root_index(),
        }
    }

    pub fn root_relndx(&self) -> i64 {
        match self {
            PlanMessage::Substrait(msg) => msg.root_relndx(),
        }
    }

    pub fn root_relation(&self) -> Option<&proto::PlanRel> {
        match self {
            PlanMessage::Substrait(msg) => msg.root_relation(),
        }
    }

    pub fn relation_count(&self) -> usize {
        match self {
            PlanMessage::Substrait(msg) => msg.relation_count(),
        }
    }

    /// The underlying Substrait plan.
    pub fn substrait_plan(&self) -> &proto::Plan {
        match self {
            PlanMessage::Substrait(msg) => msg.payload(),
        }
    }
}

impl From<SubstraitMessage> for PlanMessage {
    fn from(msg: SubstraitMessage) -> Self {
        PlanMessage::Substrait(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RootError;
    use substrait::proto::plan_rel::RelType;

    fn leaf() -> proto::PlanRel {
        proto::PlanRel {
            rel_type: Some(RelType::Rel(proto::Rel { rel_type: None })),
        }
    }

    fn root() -> proto::PlanRel {
        proto::PlanRel {
            rel_type: Some(RelType::Root(proto::RelRoot {
                input: Some(proto::Rel { rel_type: None }),
                names: vec!["o_orderkey".into()],
            })),
        }
    }

    fn plan(relations: Vec<proto::PlanRel>) -> proto::Plan {
        proto::Plan {
            relations,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_is_unresolved() {
        let msg = SubstraitMessage::new(plan(vec![leaf(), root()]));
        assert_eq!(msg.root_index(), None);
        assert_eq!(msg.root_relndx(), ROOT_SENTINEL);
        assert!(msg.root_relation().is_none());
    }

    #[test]
    fn test_with_root_validates_index() {
        let msg = SubstraitMessage::with_root(plan(vec![leaf(), root()]), 1).unwrap();
        assert_eq!(msg.root_index(), Some(1));
        assert_eq!(msg.rel_root().unwrap().names, vec!["o_orderkey".to_string()]);

        let err = SubstraitMessage::with_root(plan(vec![leaf(), root()]), 0).unwrap_err();
        assert!(matches!(
            err,
            PlanError::RootResolution(RootError::NotRoot { index: 0 })
        ));

        let err = SubstraitMessage::with_root(plan(vec![root()]), 5).unwrap_err();
        assert!(matches!(
            err,
            PlanError::RootResolution(RootError::OutOfRange {
                index: 5,
                relation_count: 1
            })
        ));
    }

    #[test]
    fn test_resolve_root_stores_index() {
        let mut msg = SubstraitMessage::new(plan(vec![leaf(), leaf(), root()]));
        assert_eq!(msg.resolve_root().unwrap(), 2);
        assert_eq!(msg.root_relndx(), 2);
        assert!(msg.root_relation().is_some());
    }

    #[test]
    fn test_failed_resolution_clears_root() {
        let mut msg = SubstraitMessage::resolved(plan(vec![root(), leaf()])).unwrap();
        msg.payload_mut().relations.push(root());
        assert_eq!(msg.root_index(), None);

        let err = msg.resolve_root().unwrap_err();
        assert!(matches!(
            err,
            PlanError::RootResolution(RootError::Count { count: 2 })
        ));
        assert_eq!(msg.root_relndx(), ROOT_SENTINEL);
    }

    #[test]
    fn test_replace_payload_drops_root() {
        let mut msg = SubstraitMessage::resolved(plan(vec![root()])).unwrap();
        let old = msg.replace_payload(plan(vec![leaf(), root()]));
        assert_eq!(old.relations.len(), 1);
        assert_eq!(msg.root_index(), None);
        assert_eq!(msg.resolve_root().unwrap(), 1);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let msg = SubstraitMessage::resolved(plan(vec![leaf(), root()])).unwrap();
        let bytes = msg.serialize().unwrap();

        let mut decoded = SubstraitMessage::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.root_index(), None);
        assert_eq!(decoded.relation_count(), 2);
        assert_eq!(decoded.resolve_root().unwrap(), 1);
        assert_eq!(decoded.payload(), msg.payload());
    }

    #[test]
    fn test_serialize_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no-such-dir").join("plan.substrait");
        let msg = PlanMessage::from(SubstraitMessage::new(plan(vec![root()])));
        assert!(matches!(
            msg.serialize_to_file(&out),
            Err(PlanError::Resource { .. })
        ));
        assert!(!out.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_write_keeps_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("out.substrait");
        std::os::unix::fs::symlink("/dev/full", &link).unwrap();

        let msg = SubstraitMessage::new(plan(vec![leaf(), root()]));
        assert!(matches!(
            msg.serialize_to_file(&link),
            Err(PlanError::Resource { .. })
        ));

        let link_meta = std::fs::symlink_metadata(&link).unwrap();
        assert!(link_meta.file_type().is_symlink());
        assert!(Path::new("/dev/full").exists());
    }

    #[test]
    fn test_plan_message_delegates() {
        let mut msg = PlanMessage::substrait_from_bytes(
            &plan(vec![leaf(), root(), leaf()]).encode_to_vec(),
        )
        .unwrap();
        assert_eq!(msg.relation_count(), 3);
        assert_eq!(msg.root_relndx(), ROOT_SENTINEL);
        assert_eq!(msg.resolve_root().unwrap(), 1);
        assert_eq!(msg.root_index(), Some(1));
        assert!(msg.root_relation().is_some());
        assert_eq!(msg.substrait_plan().relations.len(), 3);
    }
}
