//! # Root Resolution
//!
//! A Substrait `Plan` carries an ordered list of `PlanRel` entries. Exactly one of
//! them must be a `RelRoot`: the entry point of the operator tree. This module finds
//! that entry, or reports why the plan does not have a well-formed one.
//!
//! ## Scan Policy
//!
//! The scan always walks the whole relation list. It does not stop at the second
//! `RelRoot` because the number of roots found is part of the diagnostic. When the
//! count is anything other than 1 the plan has no root: which candidate was seen
//! last is not exposed through [`RootScan::resolve`].
//!
//! ## Sentinel Form
//!
//! Callers that store the root as a plain integer use [`ROOT_SENTINEL`] (`-1`) for
//! "unresolved or invalid". [`sentinel_or`] maps a resolution result onto that form.

use substrait::proto;
use substrait::proto::plan_rel::RelType;

use crate::error::RootError;

/// Integer stand-in for "no valid root resolved".
pub const ROOT_SENTINEL: i64 = -1;

/// Result of one full pass over a plan's relation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RootScan {
    root_count: usize,
    last_root: Option<usize>,
    relation_count: usize,
}

impl RootScan {
    /// Scan every relation of `plan`, counting `RelRoot` entries.
    pub fn of(plan: &proto::Plan) -> Self {
        let mut scan = RootScan {
            relation_count: plan.relations.len(),
            ..Default::default()
        };

        for (ndx, plan_rel) in plan.relations.iter().enumerate() {
            if is_root(plan_rel) {
                scan.root_count += 1;
                scan.last_root = Some(ndx);
            }
        }

        scan
    }

    /// Number of `RelRoot` entries seen.
    pub fn root_count(&self) -> usize {
        self.root_count
    }

    /// Number of relations scanned.
    pub fn relation_count(&self) -> usize {
        self.relation_count
    }

    /// The root index, if and only if exactly one `RelRoot` was seen.
    pub fn resolve(&self) -> Result<usize, RootError> {
        match (self.root_count, self.last_root) {
            (1, Some(ndx)) => Ok(ndx),
            (count, _) => Err(RootError::Count { count }),
        }
    }
}

/// Whether a plan relation is tagged as the plan's root.
pub fn is_root(plan_rel: &proto::PlanRel) -> bool {
    matches!(plan_rel.rel_type, Some(RelType::Root(_)))
}

/// Locate the unique root relation of `plan`.
pub fn find_plan_root(plan: &proto::Plan) -> Result<usize, RootError> {
    let scan = RootScan::of(plan);
    tracing::debug!(
        relations = scan.relation_count(),
        roots = scan.root_count(),
        "scanned plan for root relations"
    );

    scan.resolve().inspect_err(|err| tracing::error!("{err}"))
}

/// Check that `index` names a `RelRoot` entry of `plan`.
///
/// Only range and tag are checked; a plan with a second root elsewhere still passes.
/// Use [`find_plan_root`] when the whole relation list has to be validated.
pub fn validate_root_index(plan: &proto::Plan, index: usize) -> Result<usize, RootError> {
    let plan_rel = plan.relations.get(index).ok_or(RootError::OutOfRange {
        index,
        relation_count: plan.relations.len(),
    })?;

    if !is_root(plan_rel) {
        return Err(RootError::NotRoot { index });
    }
    Ok(index)
}

/// Collapse a resolution result into the sentinel form.
pub fn sentinel_or(resolved: Result<usize, RootError>) -> i64 {
    match resolved {
        Ok(ndx) => ndx as i64,
        Err(_) => ROOT_SENTINEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf() -> proto::PlanRel {
        proto::PlanRel {
            rel_type: Some(RelType::Rel(proto::Rel { rel_type: None })),
        }
    }

    fn root() -> proto::PlanRel {
        proto::PlanRel {
            rel_type: Some(RelType::Root(proto::RelRoot {
                input: Some(proto::Rel { rel_type: None }),
                names: vec!["col_0".into()],
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
    fn test_single_root_resolves() {
        let p = plan(vec![leaf(), root(), leaf()]);
        assert_eq!(find_plan_root(&p), Ok(1));
    }

    #[test]
    fn test_no_root_reports_zero() {
        let p = plan(vec![leaf(), leaf(), leaf()]);
        assert_eq!(find_plan_root(&p), Err(RootError::Count { count: 0 }));
        assert_eq!(sentinel_or(find_plan_root(&p)), ROOT_SENTINEL);
    }

    #[test]
    fn test_scan_counts_every_root() {
        let p = plan(vec![root(), leaf(), root(), root(), leaf()]);
        let scan = RootScan::of(&p);
        assert_eq!(scan.root_count(), 3);
        assert_eq!(scan.relation_count(), 5);
        assert_eq!(scan.resolve(), Err(RootError::Count { count: 3 }));
    }

    #[test]
    fn test_empty_plan_has_no_root() {
        assert_eq!(
            find_plan_root(&plan(vec![])),
            Err(RootError::Count { count: 0 })
        );
    }

    #[test]
    fn test_unset_rel_type_is_not_root() {
        let p = plan(vec![proto::PlanRel { rel_type: None }, root()]);
        assert_eq!(find_plan_root(&p), Ok(1));
    }

    #[test]
    fn test_validate_root_index() {
        let p = plan(vec![leaf(), root()]);
        assert_eq!(validate_root_index(&p, 1), Ok(1));
        assert_eq!(
            validate_root_index(&p, 0),
            Err(RootError::NotRoot { index: 0 })
        );
        assert_eq!(
            validate_root_index(&p, 2),
            Err(RootError::OutOfRange {
                index: 2,
                relation_count: 2
            })
        );
    }
}
