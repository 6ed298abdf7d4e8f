//! Sure winning regions for two-player turn-based games.
//!
//! [`SureWinReach`] runs the classic attractor (backward induction)
//! fixpoint: rank 0 is the final set; a node joins rank `r+1` if its
//! controller can force the play into rank `<= r` (the controlling player
//! has some winning successor, the opponent has only winning successors).
//! Nodes never attracted are winning for the opponent with rank infinity.
//!
//! [`SureWinSafe`] is solved entirely by reduction: the opponent plays
//! reachability towards the complement of the safe set, and the safety
//! winner at every node is exactly the winner of that dual game.
//!
//! The canonical strategy edge of a winning node is the first of its
//! out-edges leading into the already-won region; adjacency iterates in
//! ascending `(successor, key)` order, so the tie-break is the lowest
//! successor id and is stable across runs.

use std::collections::BTreeSet;

use log::debug;

use crate::errors::{Error, Result};
use crate::graph::{Graph, GraphView};
use crate::property::{EdgePropertyMap, NodePropertyMap};
use crate::solver::{already_solved, ensure_solved, warn_unless_flag, Solver, SolverStatus};
use crate::subgraph::SubGraph;
use crate::types::{Edge, NodeId, Player, Rank};
use crate::value::PropValue;

/// The player controlling each node, read from the `turn` node property.
fn turn_vector(graph: &Graph) -> Result<Vec<Player>> {
    graph
        .nodes()
        .into_iter()
        .map(|uid| {
            let id = graph
                .node_prop("turn", uid)?
                .as_int()
                .ok_or_else(|| Error::MalformedProperty(format!("turn of node {}", uid)))?;
            Player::from_id(id)
        })
        .collect()
}

/// Sure winning region and strategy for a reachability objective in a
/// deterministic two-player turn-based game.
pub struct SureWinReach<'g> {
    graph: &'g Graph,
    solution: SubGraph<'g, Graph>,
    player: Player,
    final_nodes: BTreeSet<NodeId>,
    status: SolverStatus,
    rank: NodePropertyMap<Rank>,
    node_winner: NodePropertyMap<Option<Player>>,
    edge_winner: EdgePropertyMap<Option<Player>>,
}

impl<'g> SureWinReach<'g> {
    /// Creates a solver for `player` trying to reach `final_nodes`.
    ///
    /// Warns (without failing) if the graph does not carry
    /// `is_deterministic` / `is_turn_based` flags set to true; solving
    /// proceeds on the caller's responsibility.
    pub fn new(
        graph: &'g Graph,
        final_nodes: impl IntoIterator<Item = NodeId>,
        player: Player,
    ) -> Result<Self> {
        let final_nodes: BTreeSet<NodeId> = final_nodes.into_iter().collect();
        crate::solver::check_final_nodes(graph, &final_nodes)?;
        warn_unless_flag(graph, "is_deterministic", "SureWinReach");
        warn_unless_flag(graph, "is_turn_based", "SureWinReach");

        Ok(Self {
            graph,
            solution: SubGraph::new(graph),
            player,
            final_nodes,
            status: SolverStatus::Unsolved,
            rank: NodePropertyMap::new(Rank::Infinite),
            node_winner: NodePropertyMap::new(None),
            edge_winner: EdgePropertyMap::new(None),
        })
    }

    /// Like [`SureWinReach::new`], with the final set read from the
    /// graph's `final` node property.
    pub fn with_final_property(graph: &'g Graph, player: Player) -> Result<Self> {
        let final_nodes = crate::solver::final_from_property(graph)?;
        Self::new(graph, final_nodes, player)
    }

    pub fn graph(&self) -> &Graph {
        self.graph
    }

    pub fn player(&self) -> Player {
        self.player
    }

    /// The winner at `uid` (every node has one after solving).
    pub fn winner(&self, uid: NodeId) -> Result<Player> {
        ensure_solved(self.status)?;
        if !self.graph.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
        let winner = *self.node_winner.get(uid);
        Ok(winner.expect("every node has a winner after solving"))
    }

    /// The attractor rank of `uid` (`Infinite` for opponent-won nodes).
    pub fn rank_of(&self, uid: NodeId) -> Result<Rank> {
        ensure_solved(self.status)?;
        if !self.graph.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
        Ok(*self.rank.get(uid))
    }

    /// The winner of `edge`, if one was assigned during solving.
    pub fn edge_winner_of(&self, edge: &Edge) -> Result<Option<Player>> {
        ensure_solved(self.status)?;
        if !self.graph.has_edge(edge) {
            return Err(Error::InvalidEdge(*edge));
        }
        Ok(*self.edge_winner.get(edge))
    }

    /// All nodes won by `player`, ascending.
    pub fn winning_region(&self, player: Player) -> Result<BTreeSet<NodeId>> {
        ensure_solved(self.status)?;
        Ok(self
            .graph
            .nodes()
            .into_iter()
            .filter(|&uid| self.node_winner.get(uid) == &Some(player))
            .collect())
    }

    /// The canonical strategy edge at `uid`: the lowest out-edge won by
    /// the node's winner, or `None` if the winner has no winning move
    /// from here (e.g. the node is won by the other player).
    pub fn strategy_edge(&self, uid: NodeId) -> Result<Option<Edge>> {
        let winner = self.winner(uid)?;
        Ok(self
            .graph
            .out_edges(uid)
            .into_iter()
            .find(|edge| self.edge_winner.get(edge) == &Some(winner)))
    }

    /// The node-winner map as property values (1 or 2), for registration
    /// on a graph or for serialization.
    pub fn export_node_winner(&self) -> Result<NodePropertyMap<PropValue>> {
        ensure_solved(self.status)?;
        let mut map = NodePropertyMap::new(PropValue::Null);
        for uid in self.graph.nodes() {
            let winner = *self.node_winner.get(uid);
            map.set(uid, PropValue::from(winner.map(Player::id)));
        }
        Ok(map)
    }

    /// The edge-winner map as property values.
    pub fn export_edge_winner(&self) -> Result<EdgePropertyMap<PropValue>> {
        ensure_solved(self.status)?;
        let mut map = EdgePropertyMap::new(PropValue::Null);
        for edge in self.graph.edges() {
            let winner = *self.edge_winner.get(&edge);
            map.set(edge, PropValue::from(winner.map(Player::id)));
        }
        Ok(map)
    }

    /// The rank map as property values (`null` = infinity).
    pub fn export_rank(&self) -> Result<NodePropertyMap<PropValue>> {
        ensure_solved(self.status)?;
        let mut map = NodePropertyMap::new(PropValue::Null);
        for uid in self.graph.nodes() {
            map.set(uid, PropValue::from(*self.rank.get(uid)));
        }
        Ok(map)
    }

    fn run_attractor(&mut self) -> Result<()> {
        let turn = turn_vector(self.graph)?;
        let opponent = self.player.opponent();

        let mut win: BTreeSet<NodeId> = self.final_nodes.clone();
        let mut rank = 0u32;

        for &uid in &win {
            self.rank.set(uid, Rank::Finite(0));
            self.node_winner.set(uid, Some(self.player));
            for edge in self.solution.out_edges(uid) {
                self.edge_winner.set(edge, Some(self.player));
            }
        }

        loop {
            let mut predecessors = BTreeSet::new();
            for &uid in &win {
                predecessors.extend(self.solution.predecessors(uid));
            }

            let mut next_level = BTreeSet::new();
            for &uid in predecessors.difference(&win) {
                let attracted = if turn[uid] == self.player {
                    self.solution.successors(uid).iter().any(|v| win.contains(v))
                } else {
                    self.solution.successors(uid).iter().all(|v| win.contains(v))
                };
                if attracted {
                    next_level.insert(uid);
                }
            }

            if next_level.is_empty() {
                break;
            }

            rank += 1;
            debug!("attractor rank {}: {} new nodes", rank, next_level.len());
            for &uid in &next_level {
                self.rank.set(uid, Rank::Finite(rank));
                self.node_winner.set(uid, Some(self.player));
                // Edges into the previously won region are winning moves;
                // everything else from this node favors the opponent.
                for edge in self.solution.out_edges(uid) {
                    let winner = if win.contains(&edge.dst) {
                        self.player
                    } else {
                        opponent
                    };
                    self.edge_winner.set(edge, Some(winner));
                }
            }

            win.extend(next_level);
        }

        for uid in self.solution.nodes() {
            if !win.contains(&uid) {
                self.node_winner.set(uid, Some(opponent));
            }
        }

        debug!(
            "attractor fixpoint: {} of {} nodes won by {}",
            win.len(),
            self.graph.number_of_nodes(),
            self.player
        );
        Ok(())
    }
}

impl<'g> Solver for SureWinReach<'g> {
    fn status(&self) -> SolverStatus {
        self.status
    }

    fn solve(&mut self) -> Result<()> {
        if already_solved("SureWinReach", self.status) {
            return Ok(());
        }
        self.status = SolverStatus::Solving;
        self.run_attractor()?;
        self.status = SolverStatus::Solved;
        Ok(())
    }

    fn reset(&mut self) {
        self.solution = SubGraph::new(self.graph);
        self.rank = NodePropertyMap::new(Rank::Infinite);
        self.node_winner = NodePropertyMap::new(None);
        self.edge_winner = EdgePropertyMap::new(None);
        self.status = SolverStatus::Unsolved;
    }
}

/// Sure winning region for a safety objective: keep the play inside the
/// safe set forever.
///
/// Solved by exact reduction: the opponent gets a reachability objective
/// for the complement of the safe set, and the safety winner at every
/// node is the winner of that dual game. No separate fixpoint exists.
pub struct SureWinSafe<'g> {
    graph: &'g Graph,
    player: Player,
    dual: SureWinReach<'g>,
    status: SolverStatus,
    edge_winner: EdgePropertyMap<Option<Player>>,
}

impl<'g> SureWinSafe<'g> {
    /// Creates a solver for `player` trying to stay within `safe_nodes`.
    pub fn new(
        graph: &'g Graph,
        safe_nodes: impl IntoIterator<Item = NodeId>,
        player: Player,
    ) -> Result<Self> {
        let safe: BTreeSet<NodeId> = safe_nodes.into_iter().collect();
        crate::solver::check_final_nodes(graph, &safe)?;

        let unsafe_nodes: BTreeSet<NodeId> = graph
            .nodes()
            .into_iter()
            .filter(|uid| !safe.contains(uid))
            .collect();
        let dual = SureWinReach::new(graph, unsafe_nodes, player.opponent())?;

        Ok(Self {
            graph,
            player,
            dual,
            status: SolverStatus::Unsolved,
            edge_winner: EdgePropertyMap::new(None),
        })
    }

    /// Like [`SureWinSafe::new`], with the safe set read from the graph's
    /// `final` node property.
    pub fn with_final_property(graph: &'g Graph, player: Player) -> Result<Self> {
        let safe = crate::solver::final_from_property(graph)?;
        Self::new(graph, safe, player)
    }

    pub fn winner(&self, uid: NodeId) -> Result<Player> {
        ensure_solved(self.status)?;
        self.dual.winner(uid)
    }

    pub fn winning_region(&self, player: Player) -> Result<BTreeSet<NodeId>> {
        ensure_solved(self.status)?;
        self.dual.winning_region(player)
    }

    pub fn edge_winner_of(&self, edge: &Edge) -> Result<Option<Player>> {
        ensure_solved(self.status)?;
        if !self.graph.has_edge(edge) {
            return Err(Error::InvalidEdge(*edge));
        }
        Ok(*self.edge_winner.get(edge))
    }

    /// The canonical safety strategy edge at a node won by the safety
    /// player: the lowest out-edge that stays inside the safe region.
    pub fn strategy_edge(&self, uid: NodeId) -> Result<Option<Edge>> {
        let winner = self.winner(uid)?;
        Ok(self
            .graph
            .out_edges(uid)
            .into_iter()
            .find(|edge| self.edge_winner.get(edge) == &Some(winner)))
    }
}

impl<'g> Solver for SureWinSafe<'g> {
    fn status(&self) -> SolverStatus {
        self.status
    }

    fn solve(&mut self) -> Result<()> {
        if already_solved("SureWinSafe", self.status) {
            return Ok(());
        }
        self.status = SolverStatus::Solving;
        self.dual.solve()?;

        // Safety strategy: an edge of a safety-won node wins iff it stays
        // inside the safety-winning region. Opponent edges keep their
        // labels from the dual reachability game.
        for uid in self.graph.nodes() {
            let winner = self.dual.winner(uid)?;
            for edge in self.graph.out_edges(uid) {
                if winner == self.player {
                    let stays_safe = self.dual.winner(edge.dst)? == self.player;
                    let edge_winner = if stays_safe {
                        self.player
                    } else {
                        self.player.opponent()
                    };
                    self.edge_winner.set(edge, Some(edge_winner));
                } else {
                    let dual_winner = self.dual.edge_winner_of(&edge)?;
                    self.edge_winner.set(edge, dual_winner);
                }
            }
        }

        self.status = SolverStatus::Solved;
        Ok(())
    }

    fn reset(&mut self) {
        self.dual.reset();
        self.edge_winner = EdgePropertyMap::new(None);
        self.status = SolverStatus::Unsolved;
    }
}
