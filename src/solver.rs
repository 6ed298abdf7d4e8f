//! Common solver machinery.
//!
//! Every solver binds to a base [`Graph`][crate::graph::Graph], carves a
//! private [`SubGraph`][crate::subgraph::SubGraph] workspace out of it,
//! and exposes its verdict through solver-owned property maps. The base
//! graph is never mutated, so any number of solvers may share one
//! `&Graph` as long as each owns its workspace.

use std::collections::BTreeSet;

use log::warn;

use crate::errors::{Error, Result};
use crate::graph::{Graph, GraphView};
use crate::types::NodeId;

/// Lifecycle of a solver: `Unsolved -> Solving -> Solved`, with `reset()`
/// returning to `Unsolved` and discarding the workspace.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SolverStatus {
    Unsolved,
    Solving,
    Solved,
}

/// The interface shared by all game solvers.
pub trait Solver {
    fn status(&self) -> SolverStatus;

    /// Runs the fixpoint. Calling `solve()` on an already solved solver
    /// logs a warning and changes nothing.
    fn solve(&mut self) -> Result<()>;

    /// Returns to `Unsolved`, discarding the previous solution.
    fn reset(&mut self);

    fn is_solved(&self) -> bool {
        self.status() == SolverStatus::Solved
    }
}

/// Guard for output accessors: an error unless the solver has finished.
pub(crate) fn ensure_solved(status: SolverStatus) -> Result<()> {
    if status == SolverStatus::Solved {
        Ok(())
    } else {
        Err(Error::NotSolved)
    }
}

/// True (and consumed as a no-op) when `solve()` is called redundantly.
pub(crate) fn already_solved(name: &str, status: SolverStatus) -> bool {
    if status == SolverStatus::Solved {
        warn!("{}: already solved; call reset() to solve again", name);
        true
    } else {
        false
    }
}

/// The final set read from the graph's `final` node property
/// (`true` = member).
pub fn final_from_property(graph: &Graph) -> Result<BTreeSet<NodeId>> {
    let mut result = BTreeSet::new();
    for uid in graph.nodes() {
        if graph.node_prop("final", uid)? == &crate::value::PropValue::Bool(true) {
            result.insert(uid);
        }
    }
    Ok(result)
}

/// Validates that every node of `final_nodes` exists in `graph`.
pub(crate) fn check_final_nodes(graph: &Graph, final_nodes: &BTreeSet<NodeId>) -> Result<()> {
    for &uid in final_nodes {
        if !graph.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
    }
    Ok(())
}

/// Warns when a graph-level boolean flag is absent or false. The solver
/// proceeds regardless; correctness is then the caller's responsibility.
pub(crate) fn warn_unless_flag(graph: &Graph, name: &str, solver: &str) {
    let holds = graph
        .graph_prop(name)
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if !holds {
        warn!("{} expects a graph with {} = true", solver, name);
    }
}
