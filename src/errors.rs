use thiserror::Error;

use crate::types::{Edge, NodeId};

/// The crate-wide error type.
///
/// Structural errors (invalid node, non-determinism, querying an unsolved
/// solver) are returned eagerly and indicate a caller or model bug.
/// Recoverable conditions (re-solving an already solved game, missing
/// determinism flags) are reported through `log::warn!` instead and never
/// produce an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// The node id is not present in the graph.
    #[error("node {0} is not in the graph")]
    InvalidNode(NodeId),

    /// The edge triple is not present in the graph.
    #[error("edge {0} is not in the graph")]
    InvalidEdge(Edge),

    /// The operation is not supported on this structure.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A property with this name is already registered in another scope.
    ///
    /// Node, edge and graph properties share a single namespace: the same
    /// name may not be registered twice across scopes.
    #[error("property '{0}' is already registered")]
    DuplicateProperty(String),

    /// No property with this name is registered in any scope.
    #[error("'{0}' is not a registered node/edge/graph property")]
    UnknownProperty(String),

    /// A property value does not have the shape an algorithm expects
    /// (e.g. a `turn` entry that is not a player id).
    #[error("malformed property value: {0}")]
    MalformedProperty(String),

    /// A model declared itself deterministic, but its transition function
    /// produced more than one distinct next state.
    #[error("non-determinism detected at state {state}, action {action}")]
    NonDeterminism { state: String, action: String },

    /// Pointed graph expansion was requested on a model without an
    /// initial state.
    #[error("model has no initial state; pointed expansion is impossible")]
    NotPointed,

    /// Solver output was queried before `solve()` completed.
    #[error("solver output queried before solve()")]
    NotSolved,

    /// JSON (de)serialization failure.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
