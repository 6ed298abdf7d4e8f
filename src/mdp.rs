//! Almost-sure and positive-probability reachability in MDPs.
//!
//! Both solvers view the graph as an MDP: node = state, edge = one
//! probabilistic outcome of an action, with the action recorded in the
//! `input` edge property. Probabilities themselves are irrelevant here;
//! only the support of each action matters.
//!
//! [`AlmostSureWinReach`] implements Alg. 45 of Baier & Katoen,
//! *Principles of Model Checking*: make the target absorbing, then
//! repeatedly disconnect states that cannot reach it under the still
//! enabled actions, pruning the offending actions from their
//! predecessors. What survives is the probability-1 winning region, and
//! the surviving edges form the permissive winning strategy.
//!
//! [`PositiveWinReach`] is plain backward reachability: a state wins with
//! positive probability iff some path reaches the target at all
//! (Alg. 46 reduces to this on the support graph).

use std::collections::BTreeSet;

use log::debug;

use crate::errors::{Error, Result};
use crate::graph::{Graph, GraphView};
use crate::property::{EdgePropertyMap, NodePropertyMap};
use crate::solver::{already_solved, check_final_nodes, ensure_solved, Solver, SolverStatus};
use crate::subgraph::SubGraph;
use crate::types::{Edge, NodeId};
use crate::value::PropValue;

/// Nodes of the view with no visible path to the final set.
fn disconnected<G: GraphView>(view: &SubGraph<'_, G>, final_nodes: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
    let reachable = view.reverse_bfs(final_nodes.iter().copied());
    view.nodes()
        .into_iter()
        .filter(|uid| !reachable.contains(uid))
        .collect()
}

/// Almost-sure (probability 1) reachability of a final set in an MDP.
pub struct AlmostSureWinReach<'g> {
    graph: &'g Graph,
    solution: SubGraph<'g, Graph>,
    final_nodes: BTreeSet<NodeId>,
    status: SolverStatus,
    winning: NodePropertyMap<bool>,
    enabled: EdgePropertyMap<bool>,
}

impl<'g> AlmostSureWinReach<'g> {
    /// Creates a solver for reaching `final_nodes` with probability 1.
    ///
    /// The graph must carry an `input` edge property naming the action of
    /// every edge; `solve()` fails without it.
    pub fn new(graph: &'g Graph, final_nodes: impl IntoIterator<Item = NodeId>) -> Result<Self> {
        let final_nodes: BTreeSet<NodeId> = final_nodes.into_iter().collect();
        check_final_nodes(graph, &final_nodes)?;

        Ok(Self {
            graph,
            solution: SubGraph::new(graph),
            final_nodes,
            status: SolverStatus::Unsolved,
            winning: NodePropertyMap::new(false),
            enabled: EdgePropertyMap::new(false),
        })
    }

    /// Like [`AlmostSureWinReach::new`], with the final set read from the
    /// graph's `final` node property.
    pub fn with_final_property(graph: &'g Graph) -> Result<Self> {
        let final_nodes = crate::solver::final_from_property(graph)?;
        Self::new(graph, final_nodes)
    }

    /// Whether `uid` wins with probability 1.
    pub fn is_winning(&self, uid: NodeId) -> Result<bool> {
        ensure_solved(self.status)?;
        if !self.graph.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
        Ok(*self.winning.get(uid))
    }

    /// The almost-sure winning region, ascending.
    pub fn winning_region(&self) -> Result<BTreeSet<NodeId>> {
        ensure_solved(self.status)?;
        Ok(self
            .graph
            .nodes()
            .into_iter()
            .filter(|&uid| *self.winning.get(uid))
            .collect())
    }

    /// Whether `edge` belongs to the permissive winning strategy.
    pub fn is_enabled(&self, edge: &Edge) -> Result<bool> {
        ensure_solved(self.status)?;
        if !self.graph.has_edge(edge) {
            return Err(Error::InvalidEdge(*edge));
        }
        Ok(*self.enabled.get(edge))
    }

    /// Out-edges of `uid` kept by the permissive strategy.
    pub fn enabled_edges(&self, uid: NodeId) -> Result<Vec<Edge>> {
        ensure_solved(self.status)?;
        if !self.graph.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
        Ok(self
            .graph
            .out_edges(uid)
            .into_iter()
            .filter(|edge| *self.enabled.get(edge))
            .collect())
    }

    /// The distinct actions the permissive strategy may play at `uid`.
    pub fn enabled_actions(&self, uid: NodeId) -> Result<Vec<PropValue>> {
        let input = self.graph.edge_property_map("input")?;
        let mut actions = Vec::new();
        for edge in self.enabled_edges(uid)? {
            let action = input.get(&edge).clone();
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
        Ok(actions)
    }

    /// The winning region as a boolean node property map.
    pub fn export_winning(&self) -> Result<NodePropertyMap<PropValue>> {
        ensure_solved(self.status)?;
        let mut map = NodePropertyMap::new(PropValue::Bool(false));
        for uid in self.graph.nodes() {
            map.set(uid, PropValue::Bool(*self.winning.get(uid)));
        }
        Ok(map)
    }

    /// The permissive strategy as a boolean edge property map.
    pub fn export_enabled(&self) -> Result<EdgePropertyMap<PropValue>> {
        ensure_solved(self.status)?;
        let mut map = EdgePropertyMap::new(PropValue::Bool(false));
        for edge in self.graph.edges() {
            map.set(edge, PropValue::Bool(*self.enabled.get(&edge)));
        }
        Ok(map)
    }

    /// Hides every still visible out-edge of `uid` labeled `action`.
    fn remove_action(
        solution: &mut SubGraph<'g, Graph>,
        input: &EdgePropertyMap<PropValue>,
        uid: NodeId,
        action: &PropValue,
    ) -> Result<()> {
        for edge in solution.out_edges(uid) {
            if input.get(&edge) == action {
                solution.hide_edge(&edge)?;
            }
        }
        Ok(())
    }

    fn run_fixpoint(&mut self) -> Result<()> {
        let graph: &'g Graph = self.graph;
        let input = graph.edge_property_map("input")?;

        // Make the target absorbing: once reached, the play never leaves.
        for &uid in &self.final_nodes {
            for edge in self.solution.out_edges(uid) {
                self.solution.hide_edge(&edge)?;
            }
        }

        let mut dead = disconnected(&self.solution, &self.final_nodes);
        while !dead.is_empty() {
            debug!("disconnected round: {} nodes", dead.len());
            let mut stack: Vec<NodeId> = dead.iter().copied().collect();
            let mut known_dead = dead.clone();

            while let Some(u) = stack.pop() {
                // Predecessors and the actions taking them into `u`,
                // captured before `u` disappears from the view.
                let preds: Vec<(NodeId, PropValue)> = self
                    .solution
                    .in_edges(u)
                    .into_iter()
                    .map(|edge| (edge.src, input.get(&edge).clone()))
                    .collect();

                for (t, action) in preds {
                    if known_dead.contains(&t) {
                        continue;
                    }
                    Self::remove_action(&mut self.solution, input, t, &action)?;
                    if self.solution.successors(t).is_empty() && !self.final_nodes.contains(&t) {
                        stack.push(t);
                        known_dead.insert(t);
                    }
                }

                self.solution.hide_node(u)?;
            }

            dead = disconnected(&self.solution, &self.final_nodes);
        }

        // Visible nodes win with probability 1; their surviving edges are
        // the permissive strategy (an action stays enabled iff at least
        // one of its edges survived).
        for uid in self.graph.nodes() {
            let visible = self.solution.is_node_visible(uid);
            self.winning.set(uid, visible);
            if !visible {
                continue;
            }

            let mut winning_actions = Vec::new();
            for edge in self.solution.out_edges(uid) {
                let action = input.get(&edge).clone();
                if !winning_actions.contains(&action) {
                    winning_actions.push(action);
                }
            }
            for edge in self.graph.out_edges(uid) {
                self.enabled
                    .set(edge, winning_actions.contains(input.get(&edge)));
            }
        }

        debug!(
            "almost-sure fixpoint: {} of {} nodes winning",
            self.solution.number_of_visible_nodes(),
            self.graph.number_of_nodes()
        );
        Ok(())
    }
}

impl<'g> Solver for AlmostSureWinReach<'g> {
    fn status(&self) -> SolverStatus {
        self.status
    }

    fn solve(&mut self) -> Result<()> {
        if already_solved("AlmostSureWinReach", self.status) {
            return Ok(());
        }
        self.status = SolverStatus::Solving;
        self.run_fixpoint()?;
        self.status = SolverStatus::Solved;
        Ok(())
    }

    fn reset(&mut self) {
        self.solution = SubGraph::new(self.graph);
        self.winning = NodePropertyMap::new(false);
        self.enabled = EdgePropertyMap::new(false);
        self.status = SolverStatus::Unsolved;
    }
}

/// Positive-probability reachability of a final set in an MDP.
///
/// The winning region is exactly the set of nodes with some path to the
/// target; no action pruning is needed.
pub struct PositiveWinReach<'g> {
    graph: &'g Graph,
    solution: SubGraph<'g, Graph>,
    final_nodes: BTreeSet<NodeId>,
    status: SolverStatus,
    winning: NodePropertyMap<bool>,
    enabled: EdgePropertyMap<bool>,
}

impl<'g> PositiveWinReach<'g> {
    pub fn new(graph: &'g Graph, final_nodes: impl IntoIterator<Item = NodeId>) -> Result<Self> {
        let final_nodes: BTreeSet<NodeId> = final_nodes.into_iter().collect();
        check_final_nodes(graph, &final_nodes)?;

        Ok(Self {
            graph,
            solution: SubGraph::new(graph),
            final_nodes,
            status: SolverStatus::Unsolved,
            winning: NodePropertyMap::new(false),
            enabled: EdgePropertyMap::new(false),
        })
    }

    /// Like [`PositiveWinReach::new`], with the final set read from the
    /// graph's `final` node property.
    pub fn with_final_property(graph: &'g Graph) -> Result<Self> {
        let final_nodes = crate::solver::final_from_property(graph)?;
        Self::new(graph, final_nodes)
    }

    pub fn is_winning(&self, uid: NodeId) -> Result<bool> {
        ensure_solved(self.status)?;
        if !self.graph.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
        Ok(*self.winning.get(uid))
    }

    pub fn winning_region(&self) -> Result<BTreeSet<NodeId>> {
        ensure_solved(self.status)?;
        Ok(self
            .graph
            .nodes()
            .into_iter()
            .filter(|&uid| *self.winning.get(uid))
            .collect())
    }

    pub fn is_enabled(&self, edge: &Edge) -> Result<bool> {
        ensure_solved(self.status)?;
        if !self.graph.has_edge(edge) {
            return Err(Error::InvalidEdge(*edge));
        }
        Ok(*self.enabled.get(edge))
    }

    pub fn enabled_edges(&self, uid: NodeId) -> Result<Vec<Edge>> {
        ensure_solved(self.status)?;
        if !self.graph.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
        Ok(self
            .graph
            .out_edges(uid)
            .into_iter()
            .filter(|edge| *self.enabled.get(edge))
            .collect())
    }
}

impl<'g> Solver for PositiveWinReach<'g> {
    fn status(&self) -> SolverStatus {
        self.status
    }

    fn solve(&mut self) -> Result<()> {
        if already_solved("PositiveWinReach", self.status) {
            return Ok(());
        }
        self.status = SolverStatus::Solving;

        let graph: &'g Graph = self.graph;
        let input = graph.edge_property_map("input")?;
        let region = self.solution.reverse_bfs(self.final_nodes.iter().copied());

        for uid in self.graph.nodes() {
            let wins = region.contains(&uid);
            self.winning.set(uid, wins);
            if !wins {
                continue;
            }

            // Any action with at least one successor inside the region.
            let mut winning_actions = Vec::new();
            for edge in self.graph.out_edges(uid) {
                if region.contains(&edge.dst) {
                    let action = input.get(&edge).clone();
                    if !winning_actions.contains(&action) {
                        winning_actions.push(action);
                    }
                }
            }
            for edge in self.graph.out_edges(uid) {
                self.enabled
                    .set(edge, winning_actions.contains(input.get(&edge)));
            }
        }

        debug!(
            "positive reachability: {} of {} nodes winning",
            region.len(),
            self.graph.number_of_nodes()
        );
        self.status = SolverStatus::Solved;
        Ok(())
    }

    fn reset(&mut self) {
        self.solution = SubGraph::new(self.graph);
        self.winning = NodePropertyMap::new(false);
        self.enabled = EdgePropertyMap::new(false);
        self.status = SolverStatus::Unsolved;
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// A 4-state MDP: from 0, action "a" may land in the target 1 or in
    /// the trap 2; action "b" loops at 0 via 3.
    fn trap_mdp() -> Graph {
        let mut g = Graph::new();
        g.add_nodes(4);
        g.add_edge_property("input", PropValue::Null).unwrap();
        let mut put = |g: &mut Graph, u: NodeId, v: NodeId, act: &str| {
            let key = g.add_edge(u, v).unwrap();
            g.set_edge_prop("input", &Edge::new(u, v, key), act).unwrap();
        };
        put(&mut g, 0, 1, "a");
        put(&mut g, 0, 2, "a");
        put(&mut g, 0, 3, "b");
        put(&mut g, 3, 0, "a");
        put(&mut g, 1, 1, "a");
        put(&mut g, 2, 2, "a");
        g
    }

    #[test]
    fn test_almost_sure_excludes_trap_risk() {
        let g = trap_mdp();
        let mut solver = AlmostSureWinReach::new(&g, [1]).unwrap();
        solver.solve().unwrap();

        // Action "a" at 0 may fall into the trap, and "b" only loops:
        // no action guarantees the target with probability 1.
        assert_eq!(solver.winning_region().unwrap(), BTreeSet::from([1]));
        assert!(!solver.is_winning(0).unwrap());
    }

    #[test]
    fn test_positive_reaches_further() {
        let g = trap_mdp();
        let mut solver = PositiveWinReach::new(&g, [1]).unwrap();
        solver.solve().unwrap();

        // 0 reaches 1 with positive probability via "a"; 3 via 0.
        assert_eq!(solver.winning_region().unwrap(), BTreeSet::from([0, 1, 3]));
        // "a" has a successor in the region, so both its edges survive;
        // "b" leads to 3, also in the region.
        assert!(solver.is_enabled(&Edge::new(0, 1, 0)).unwrap());
        assert!(solver.is_enabled(&Edge::new(0, 2, 0)).unwrap());
        assert!(solver.is_enabled(&Edge::new(0, 3, 0)).unwrap());
    }

    #[test]
    fn test_not_solved_and_resolve() {
        let g = trap_mdp();
        let mut solver = AlmostSureWinReach::new(&g, [1]).unwrap();
        assert!(matches!(solver.winning_region(), Err(Error::NotSolved)));

        solver.solve().unwrap();
        let region = solver.winning_region().unwrap();
        solver.solve().unwrap();
        assert_eq!(solver.winning_region().unwrap(), region);

        solver.reset();
        assert!(matches!(solver.winning_region(), Err(Error::NotSolved)));
    }

    #[test]
    fn test_missing_input_property() {
        let mut g = Graph::new();
        g.add_nodes(2);
        g.add_edge(0, 1).unwrap();
        let mut solver = AlmostSureWinReach::new(&g, [1]).unwrap();
        assert!(matches!(solver.solve(), Err(Error::UnknownProperty(_))));
    }
}
