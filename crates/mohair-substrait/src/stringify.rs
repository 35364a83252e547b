//! # Plan Stringifiers
//!
//! Human-readable renderings of plans and relations, for debugging and for the
//! command-line tools. Nothing rendered here is parsed back into a plan.
//!
//! - Text form: the pretty `Debug` rendering of the prost-generated types.
//! - JSON form: the protobuf JSON mapping provided by the `serde` feature of the
//!   `substrait` crate.

use substrait::proto;

use crate::error::Result;

/// Render a whole plan as indented text.
pub fn stringify_plan(plan: &proto::Plan) -> String {
    format!("{plan:#?}")
}

/// Render one entry of a plan's relation list.
pub fn stringify_plan_rel(plan_rel: &proto::PlanRel) -> String {
    format!("{plan_rel:#?}")
}

/// Render a single relation subtree.
pub fn stringify_rel(rel: &proto::Rel) -> String {
    format!("{rel:#?}")
}

/// Render a plan as pretty-printed JSON.
pub fn jsonify_plan(plan: &proto::Plan) -> Result<String> {
    serde_json::to_string_pretty(plan).map_err(|e| {
        tracing::error!("Unable to render plan as JSON: {e}");
        e.into()
    })
}
