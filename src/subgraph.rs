//! Non-destructive shrinking views over a base graph.
//!
//! A [`SubGraph`] wraps a [`Graph`] (or another `SubGraph`) and keeps two
//! exclusion sets: hidden nodes and hidden edges. Every traversal query is
//! the base query filtered through visibility. The base is never mutated
//! or copied, so fixpoint algorithms can shrink their working view in
//! O(hidden-delta) per step while other references to the base stay valid.
//!
//! Visibility only ever shrinks: there is no un-hide operation, and the
//! hidden sets are private. A hidden element stays hidden for the
//! lifetime of the view.

use std::collections::HashSet;
use std::fmt;

use crate::bitset::BitSet;
use crate::errors::{Error, Result};
use crate::graph::{Graph, GraphView};
use crate::types::{Edge, NodeId};

/// A monotonically shrinking visibility view over a base graph.
///
/// An edge is visible iff it is not itself hidden and both its endpoints
/// are visible. Hiding a node therefore removes its incident edges from
/// every query without materializing them in the hidden-edge set.
pub struct SubGraph<'g, G: GraphView> {
    base: &'g G,
    hidden_nodes: BitSet,
    hidden_edges: HashSet<Edge>,
}

impl<'g, G: GraphView> SubGraph<'g, G> {
    /// Creates a view with everything visible.
    pub fn new(base: &'g G) -> Self {
        Self {
            base,
            hidden_nodes: BitSet::new(base.base().number_of_nodes()),
            hidden_edges: HashSet::new(),
        }
    }

    /// Hides a node (and, for query purposes, all its incident edges).
    /// Idempotent.
    pub fn hide_node(&mut self, uid: NodeId) -> Result<()> {
        if !self.base.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
        self.hidden_nodes.insert(uid);
        Ok(())
    }

    pub fn hide_nodes(&mut self, uids: impl IntoIterator<Item = NodeId>) -> Result<()> {
        for uid in uids {
            self.hide_node(uid)?;
        }
        Ok(())
    }

    /// Hides a single edge. Idempotent.
    pub fn hide_edge(&mut self, edge: &Edge) -> Result<()> {
        if !self.base.has_edge(edge) {
            return Err(Error::InvalidEdge(*edge));
        }
        self.hidden_edges.insert(*edge);
        Ok(())
    }

    pub fn hide_edges<'a>(&mut self, edges: impl IntoIterator<Item = &'a Edge>) -> Result<()> {
        for edge in edges {
            self.hide_edge(edge)?;
        }
        Ok(())
    }

    /// True iff `uid` is in the base and not hidden here.
    pub fn is_node_visible(&self, uid: NodeId) -> bool {
        self.base.has_node(uid) && !self.hidden_nodes.contains(uid)
    }

    /// True iff the edge is in the base, not hidden, and both its
    /// endpoints are visible.
    pub fn is_edge_visible(&self, edge: &Edge) -> bool {
        self.base.has_edge(edge)
            && !self.hidden_edges.contains(edge)
            && !self.hidden_nodes.contains(edge.src)
            && !self.hidden_nodes.contains(edge.dst)
    }

    /// All visible nodes, ascending.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        self.nodes()
    }

    /// Nodes of the base hidden by this view, ascending.
    pub fn hidden_nodes(&self) -> Vec<NodeId> {
        self.hidden_nodes.iter().collect()
    }

    pub fn number_of_visible_nodes(&self) -> usize {
        self.base.number_of_nodes() - self.hidden_nodes.len()
    }

    pub fn number_of_hidden_nodes(&self) -> usize {
        self.hidden_nodes.len()
    }
}

impl<'g, G: GraphView> GraphView for SubGraph<'g, G> {
    fn base(&self) -> &Graph {
        self.base.base()
    }

    fn number_of_nodes(&self) -> usize {
        self.number_of_visible_nodes()
    }

    fn number_of_edges(&self) -> usize {
        self.edges().len()
    }

    fn has_node(&self, uid: NodeId) -> bool {
        self.is_node_visible(uid)
    }

    fn has_edge(&self, edge: &Edge) -> bool {
        self.is_edge_visible(edge)
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.base
            .nodes()
            .into_iter()
            .filter(|&uid| !self.hidden_nodes.contains(uid))
            .collect()
    }

    fn edges(&self) -> Vec<Edge> {
        self.base
            .edges()
            .into_iter()
            .filter(|edge| self.is_edge_visible(edge))
            .collect()
    }

    fn successors(&self, uid: NodeId) -> Vec<NodeId> {
        let mut result: Vec<NodeId> = self
            .out_edges(uid)
            .into_iter()
            .map(|edge| edge.dst)
            .collect();
        result.dedup();
        result
    }

    fn predecessors(&self, uid: NodeId) -> Vec<NodeId> {
        let mut result: Vec<NodeId> = self
            .in_edges(uid)
            .into_iter()
            .map(|edge| edge.src)
            .collect();
        result.dedup();
        result
    }

    fn out_edges(&self, uid: NodeId) -> Vec<Edge> {
        if !self.is_node_visible(uid) {
            return Vec::new();
        }
        self.base
            .out_edges(uid)
            .into_iter()
            .filter(|edge| self.is_edge_visible(edge))
            .collect()
    }

    fn in_edges(&self, uid: NodeId) -> Vec<Edge> {
        if !self.is_node_visible(uid) {
            return Vec::new();
        }
        self.base
            .in_edges(uid)
            .into_iter()
            .filter(|edge| self.is_edge_visible(edge))
            .collect()
    }
}

impl<'g, G: GraphView> fmt::Display for SubGraph<'g, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SubGraph(visible |V|={}, hidden |V|={})",
            self.number_of_visible_nodes(),
            self.number_of_hidden_nodes()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use test_log::test;

    use super::*;

    fn chain() -> Graph {
        // 0 -> 1 -> 2 -> 3, with a parallel 1 -> 2.
        let mut g = Graph::new();
        g.add_nodes(4);
        g.add_edges([(0, 1), (1, 2), (2, 3), (1, 2)]).unwrap();
        g
    }

    #[test]
    fn test_everything_visible_initially() {
        let g = chain();
        let view = SubGraph::new(&g);
        assert_eq!(view.nodes(), vec![0, 1, 2, 3]);
        assert_eq!(view.number_of_edges(), 4);
        assert_eq!(view.successors(1), vec![2]);
    }

    #[test]
    fn test_hide_node_hides_incident_edges() {
        let g = chain();
        let mut view = SubGraph::new(&g);
        view.hide_node(2).unwrap();

        assert!(!view.has_node(2));
        assert_eq!(view.successors(1), Vec::<NodeId>::new());
        assert_eq!(view.predecessors(3), Vec::<NodeId>::new());
        assert_eq!(view.out_edges(1), Vec::<Edge>::new());
        assert_eq!(view.in_edges(3), Vec::<Edge>::new());
        // The hidden-edge set itself stays empty.
        assert_eq!(view.edges(), vec![Edge::new(0, 1, 0)]);
    }

    #[test]
    fn test_hide_edge_keeps_parallel_sibling() {
        let g = chain();
        let mut view = SubGraph::new(&g);
        view.hide_edge(&Edge::new(1, 2, 0)).unwrap();

        assert!(!view.has_edge(&Edge::new(1, 2, 0)));
        assert!(view.has_edge(&Edge::new(1, 2, 1)));
        assert_eq!(view.successors(1), vec![2]);

        view.hide_edge(&Edge::new(1, 2, 1)).unwrap();
        assert_eq!(view.successors(1), Vec::<NodeId>::new());
    }

    #[test]
    fn test_hide_is_idempotent_and_monotone() {
        let g = chain();
        let mut view = SubGraph::new(&g);
        view.hide_node(1).unwrap();
        view.hide_node(1).unwrap();
        assert_eq!(view.number_of_hidden_nodes(), 1);

        // Later hides never resurrect earlier ones.
        view.hide_node(3).unwrap();
        assert_eq!(view.nodes(), vec![0, 2]);
        assert_eq!(view.hidden_nodes(), vec![1, 3]);
    }

    #[test]
    fn test_hide_invalid_node() {
        let g = chain();
        let mut view = SubGraph::new(&g);
        assert!(matches!(view.hide_node(42), Err(Error::InvalidNode(42))));
    }

    #[test]
    fn test_nested_subgraph() {
        let g = chain();
        let mut outer = SubGraph::new(&g);
        outer.hide_node(0).unwrap();

        let mut inner = SubGraph::new(&outer);
        assert_eq!(inner.nodes(), vec![1, 2, 3]);
        // A node hidden by the outer view is invalid for the inner one.
        assert!(matches!(inner.hide_node(0), Err(Error::InvalidNode(0))));

        inner.hide_node(3).unwrap();
        assert_eq!(inner.nodes(), vec![1, 2]);
        // The outer view is unaffected.
        assert_eq!(outer.nodes(), vec![1, 2, 3]);
    }

    #[test]
    fn test_reverse_bfs_respects_visibility() {
        let g = chain();
        let mut view = SubGraph::new(&g);
        assert_eq!(view.reverse_bfs([3]), BTreeSet::from([0, 1, 2, 3]));

        view.hide_edge(&Edge::new(1, 2, 0)).unwrap();
        view.hide_edge(&Edge::new(1, 2, 1)).unwrap();
        assert_eq!(view.reverse_bfs([3]), BTreeSet::from([2, 3]));
    }
}
