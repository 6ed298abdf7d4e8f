//! # gamegraph: games on finite directed graphs
//!
//! **`gamegraph`** computes winning regions and strategies for games played on finite directed graphs ---
//! the core primitive of reactive synthesis and probabilistic model checking.
//!
//! ## What does it solve?
//!
//! Given a graph describing a system's state space and a set of target ("final") states, the solvers
//! determine from which states a player can force the play into (or keep it within) the target set:
//!
//! - **Sure reachability / safety** in deterministic two-player turn-based games, via the classic
//!   attractor fixpoint ([`zielonka`]).
//! - **Almost-sure reachability** (probability 1) and **positive reachability** (probability > 0)
//!   in Markov decision processes ([`mdp`]).
//!
//! ## Key design points
//!
//! - **Explicit graphs only**: implicit models (state/action/transition functions) are expanded once
//!   by [`graphify`] into a [`Graph`][crate::graph::Graph] with dense integer node ids; everything
//!   downstream works on the explicit form.
//! - **Sparse property maps**: node, edge and graph data live in named
//!   [`property`] maps that store only non-default values and round-trip losslessly through JSON.
//! - **Non-destructive fixpoints**: solvers never mutate the graph. Each one shrinks a private
//!   [`SubGraph`][crate::subgraph::SubGraph] view --- an exclusion set over the base --- so several
//!   solvers can share one `&Graph`.
//!
//! ## Basic Usage
//!
//! ```rust
//! use gamegraph::graph::Graph;
//! use gamegraph::solver::Solver;
//! use gamegraph::types::Player;
//! use gamegraph::value::PropValue;
//! use gamegraph::zielonka::SureWinReach;
//!
//! // 1. Build a tiny turn-based game: 0 -> 1 -> 2, with 1 able to bail to 0.
//! let mut graph = Graph::new();
//! graph.add_nodes(3);
//! graph.add_edges([(0, 1), (1, 2), (1, 0), (2, 2)]).unwrap();
//! graph.add_node_property("turn", PropValue::Null).unwrap();
//! graph.set_node_prop("turn", 0, 1).unwrap();
//! graph.set_node_prop("turn", 1, 1).unwrap();
//! graph.set_node_prop("turn", 2, 1).unwrap();
//! graph.set_graph_property("is_deterministic", true).unwrap();
//! graph.set_graph_property("is_turn_based", true).unwrap();
//!
//! // 2. Solve reachability of {2} for player 1.
//! let mut solver = SureWinReach::new(&graph, [2], Player::P1).unwrap();
//! solver.solve().unwrap();
//!
//! // 3. Player 1 controls every node, so everything wins.
//! assert_eq!(solver.winning_region(Player::P1).unwrap().len(), 3);
//! ```
//!
//! ## Core Components
//!
//! - **[`graph`]**: the multi-edge digraph engine with named property maps and serialization.
//! - **[`subgraph`]**: monotonically shrinking visibility views used as solver workspaces.
//! - **[`graphify`]**: expansion of implicit [`model`]s into explicit graphs.
//! - **[`zielonka`]** and **[`mdp`]**: the solvers.
//! - **[`dot`]**: Graphviz export for inspecting graphs and solutions.

pub mod bitset;
pub mod dot;
pub mod errors;
pub mod graph;
pub mod graphify;
pub mod mdp;
pub mod model;
pub mod property;
pub mod solver;
pub mod subgraph;
pub mod types;
pub mod value;
pub mod zielonka;
