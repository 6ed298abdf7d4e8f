//! The multi-edge directed graph engine.
//!
//! A [`Graph`] owns its node set, its edge multiset, and a table of named
//! property maps partitioned by scope (node / edge / graph). Nodes are
//! dense integer ids assigned sequentially; edges are `(src, dst, key)`
//! triples where the key numbers parallel edges per node pair. The graph
//! only ever grows: removal is deliberately unsupported, which is what
//! keeps node ids stable for every property map and solver downstream.
//! Shrinking views are provided by [`SubGraph`][crate::subgraph::SubGraph].
//!
//! Adjacency is stored in `BTreeMap`s, so every traversal query iterates
//! in ascending `(neighbor, key)` order. Algorithms that pick "the first
//! edge into the winning set" therefore have a fixed, documented
//! tie-break: the lowest successor id, then the lowest key.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bitset::BitSet;
use crate::errors::{Error, Result};
use crate::property::{
    EdgePropertyMap, NodePropertyMap, SerializedEdgeProperty, SerializedNodeProperty,
};
use crate::types::{Edge, NodeId};
use crate::value::PropValue;

/// Read-only traversal interface shared by [`Graph`] and
/// [`SubGraph`][crate::subgraph::SubGraph].
///
/// All queries are total: asking for the neighbors of a node that is not
/// in the view yields an empty list rather than an error.
pub trait GraphView {
    /// The underlying base [`Graph`] (the view itself, for a `Graph`).
    fn base(&self) -> &Graph;

    fn number_of_nodes(&self) -> usize;
    fn number_of_edges(&self) -> usize;

    fn has_node(&self, uid: NodeId) -> bool;
    fn has_edge(&self, edge: &Edge) -> bool;

    /// All nodes in the view, ascending.
    fn nodes(&self) -> Vec<NodeId>;
    /// All edges in the view, ascending by `(src, dst, key)`.
    fn edges(&self) -> Vec<Edge>;

    /// Distinct successor ids of `uid`, ascending.
    fn successors(&self, uid: NodeId) -> Vec<NodeId>;
    /// Distinct predecessor ids of `uid`, ascending.
    fn predecessors(&self, uid: NodeId) -> Vec<NodeId>;

    /// All out-edges of `uid`, ascending by `(dst, key)`.
    fn out_edges(&self, uid: NodeId) -> Vec<Edge>;
    /// All in-edges of `uid`, ascending by `(src, key)`.
    fn in_edges(&self, uid: NodeId) -> Vec<Edge>;

    /// The set of nodes from which some directed path in this view
    /// reaches a source node. Sources that are in the view are included.
    fn reverse_bfs(&self, sources: impl IntoIterator<Item = NodeId>) -> BTreeSet<NodeId>
    where
        Self: Sized,
    {
        let mut reached = BTreeSet::new();
        let mut visited = BitSet::new(self.base().number_of_nodes());
        let mut queue = VecDeque::new();

        for uid in sources {
            if self.has_node(uid) && visited.insert(uid) {
                queue.push_back(uid);
            }
        }

        while let Some(vid) = queue.pop_front() {
            reached.insert(vid);
            for edge in self.in_edges(vid) {
                if visited.insert(edge.src) {
                    queue.push_back(edge.src);
                }
            }
        }

        reached
    }
}

/// The scope a property name is registered under.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PropertyScope {
    Node,
    Edge,
    Graph,
}

/// A multi-edge directed graph with named property maps.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// out_adj[u][v] = number of parallel edges u -> v (keys 0..count).
    out_adj: Vec<BTreeMap<NodeId, u32>>,
    in_adj: Vec<BTreeMap<NodeId, u32>>,
    num_edges: usize,
    node_properties: BTreeMap<String, NodePropertyMap<PropValue>>,
    edge_properties: BTreeMap<String, EdgePropertyMap<PropValue>>,
    graph_properties: BTreeMap<String, PropValue>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new node and returns its id (the next sequential integer).
    pub fn add_node(&mut self) -> NodeId {
        let uid = self.out_adj.len();
        self.out_adj.push(BTreeMap::new());
        self.in_adj.push(BTreeMap::new());
        uid
    }

    /// Adds `count` nodes, returning their ids in creation order.
    pub fn add_nodes(&mut self, count: usize) -> Vec<NodeId> {
        (0..count).map(|_| self.add_node()).collect()
    }

    /// Adds an edge from `src` to `dst` and returns its key.
    ///
    /// Duplication is not checked: calling this twice for the same pair
    /// creates two parallel edges with keys 0 and 1.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId) -> Result<u32> {
        if !self.has_node(src) {
            return Err(Error::InvalidNode(src));
        }
        if !self.has_node(dst) {
            return Err(Error::InvalidNode(dst));
        }

        let count = self.out_adj[src].entry(dst).or_insert(0);
        let key = *count;
        *count += 1;
        *self.in_adj[dst].entry(src).or_insert(0) += 1;
        self.num_edges += 1;

        debug!("add_edge({} -> {}) = key {}", src, dst, key);
        Ok(key)
    }

    /// Adds multiple edges, returning their keys in input order.
    pub fn add_edges(&mut self, pairs: impl IntoIterator<Item = (NodeId, NodeId)>) -> Result<Vec<u32>> {
        pairs
            .into_iter()
            .map(|(src, dst)| self.add_edge(src, dst))
            .collect()
    }

    /// Node removal is unsupported: ids are never reused. Hide nodes in a
    /// [`SubGraph`][crate::subgraph::SubGraph] instead.
    pub fn rem_node(&mut self, _uid: NodeId) -> Result<()> {
        Err(Error::Unsupported(
            "node removal; hide the node in a SubGraph instead",
        ))
    }

    /// Edge removal is unsupported. Hide edges in a
    /// [`SubGraph`][crate::subgraph::SubGraph] instead.
    pub fn rem_edge(&mut self, _edge: &Edge) -> Result<()> {
        Err(Error::Unsupported(
            "edge removal; hide the edge in a SubGraph instead",
        ))
    }

    /// Number of parallel edges from `src` to `dst`.
    pub fn edge_count(&self, src: NodeId, dst: NodeId) -> u32 {
        self.out_adj
            .get(src)
            .and_then(|succ| succ.get(&dst).copied())
            .unwrap_or(0)
    }

    // ==========================================================================
    // Property registry.
    // ==========================================================================

    /// The scope `name` is registered under, if any. Lookup resolves node
    /// scope first, then edge, then graph; registration keeps the three
    /// scopes disjoint, so the order is only cosmetic.
    pub fn property_scope(&self, name: &str) -> Option<PropertyScope> {
        if self.node_properties.contains_key(name) {
            Some(PropertyScope::Node)
        } else if self.edge_properties.contains_key(name) {
            Some(PropertyScope::Edge)
        } else if self.graph_properties.contains_key(name) {
            Some(PropertyScope::Graph)
        } else {
            None
        }
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property_scope(name).is_some()
    }

    /// Registers an empty node property map with the given default.
    pub fn add_node_property(&mut self, name: &str, default: PropValue) -> Result<()> {
        self.insert_node_property(name, NodePropertyMap::new(default))
    }

    /// Registers an externally built node property map under `name`.
    ///
    /// The map is moved into the graph and owned by it from then on.
    pub fn insert_node_property(&mut self, name: &str, map: NodePropertyMap<PropValue>) -> Result<()> {
        if self.has_property(name) {
            return Err(Error::DuplicateProperty(name.to_string()));
        }
        self.node_properties.insert(name.to_string(), map);
        Ok(())
    }

    /// Registers an empty edge property map with the given default.
    pub fn add_edge_property(&mut self, name: &str, default: PropValue) -> Result<()> {
        self.insert_edge_property(name, EdgePropertyMap::new(default))
    }

    /// Registers an externally built edge property map under `name`.
    pub fn insert_edge_property(&mut self, name: &str, map: EdgePropertyMap<PropValue>) -> Result<()> {
        if self.has_property(name) {
            return Err(Error::DuplicateProperty(name.to_string()));
        }
        self.edge_properties.insert(name.to_string(), map);
        Ok(())
    }

    /// Sets a graph-level property. Re-setting an existing graph property
    /// overwrites its value; a name held by the node or edge scope is
    /// rejected.
    pub fn set_graph_property(&mut self, name: &str, value: impl Into<PropValue>) -> Result<()> {
        match self.property_scope(name) {
            Some(PropertyScope::Node) | Some(PropertyScope::Edge) => {
                Err(Error::DuplicateProperty(name.to_string()))
            }
            _ => {
                self.graph_properties.insert(name.to_string(), value.into());
                Ok(())
            }
        }
    }

    /// The registered node property map called `name`.
    pub fn node_property_map(&self, name: &str) -> Result<&NodePropertyMap<PropValue>> {
        self.node_properties
            .get(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))
    }

    /// The registered edge property map called `name`.
    pub fn edge_property_map(&self, name: &str) -> Result<&EdgePropertyMap<PropValue>> {
        self.edge_properties
            .get(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))
    }

    /// The value of node property `name` at `uid`.
    ///
    /// Reading an unset-but-valid node yields the map's default; reading
    /// an invalid node is an error, never a default.
    pub fn node_prop(&self, name: &str, uid: NodeId) -> Result<&PropValue> {
        let map = self.node_property_map(name)?;
        if !self.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
        Ok(map.get(uid))
    }

    pub fn set_node_prop(&mut self, name: &str, uid: NodeId, value: impl Into<PropValue>) -> Result<()> {
        if !self.has_node(uid) {
            return Err(Error::InvalidNode(uid));
        }
        let map = self
            .node_properties
            .get_mut(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))?;
        map.set(uid, value.into());
        Ok(())
    }

    /// The value of edge property `name` at `edge`.
    pub fn edge_prop(&self, name: &str, edge: &Edge) -> Result<&PropValue> {
        let map = self.edge_property_map(name)?;
        if !self.has_edge(edge) {
            return Err(Error::InvalidEdge(*edge));
        }
        Ok(map.get(edge))
    }

    pub fn set_edge_prop(&mut self, name: &str, edge: &Edge, value: impl Into<PropValue>) -> Result<()> {
        if !self.has_edge(edge) {
            return Err(Error::InvalidEdge(*edge));
        }
        let map = self
            .edge_properties
            .get_mut(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))?;
        map.set(*edge, value.into());
        Ok(())
    }

    /// The value of graph property `name`.
    pub fn graph_prop(&self, name: &str) -> Result<&PropValue> {
        self.graph_properties
            .get(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))
    }

    pub fn node_property_names(&self) -> impl Iterator<Item = &str> {
        self.node_properties.keys().map(String::as_str)
    }

    pub fn edge_property_names(&self) -> impl Iterator<Item = &str> {
        self.edge_properties.keys().map(String::as_str)
    }

    pub fn graph_property_names(&self) -> impl Iterator<Item = &str> {
        self.graph_properties.keys().map(String::as_str)
    }

    // ==========================================================================
    // Serialization.
    // ==========================================================================

    /// Serializes the graph into its self-describing persisted form.
    ///
    /// Edge keys are positional, so only the count of parallel edges is
    /// stored per `(src, dst)` pair; consumers reconstruct keys
    /// `0..count` in order.
    pub fn serialize(&self) -> SerializedGraph {
        let mut edges = BTreeMap::new();
        for (src, succ) in self.out_adj.iter().enumerate() {
            if succ.is_empty() {
                continue;
            }
            edges.insert(src, succ.clone());
        }

        SerializedGraph {
            nodes: self.number_of_nodes(),
            edges,
            node_properties: self
                .node_properties
                .iter()
                .map(|(name, map)| (name.clone(), map.to_serialized()))
                .collect(),
            edge_properties: self
                .edge_properties
                .iter()
                .map(|(name, map)| (name.clone(), map.to_serialized()))
                .collect(),
            graph_properties: self.graph_properties.clone(),
        }
    }

    /// Reconstructs a graph from its persisted form.
    ///
    /// Property overrides are validated against the reconstructed node
    /// and edge sets: a stale key is an error, not a silent drop.
    pub fn deserialize(obj: &SerializedGraph) -> Result<Self> {
        let mut graph = Graph::new();
        graph.add_nodes(obj.nodes);

        for (&src, succ) in &obj.edges {
            for (&dst, &count) in succ {
                for _ in 0..count {
                    graph.add_edge(src, dst)?;
                }
            }
        }

        for (name, prop) in &obj.node_properties {
            for (&uid, _) in &prop.overrides {
                if !graph.has_node(uid) {
                    return Err(Error::InvalidNode(uid));
                }
            }
            graph.insert_node_property(name, NodePropertyMap::from_serialized(prop))?;
        }

        for (name, prop) in &obj.edge_properties {
            for item in &prop.overrides {
                if !graph.has_edge(&item.edge) {
                    return Err(Error::InvalidEdge(item.edge));
                }
            }
            graph.insert_edge_property(name, EdgePropertyMap::from_serialized(prop))?;
        }

        for (name, value) in &obj.graph_properties {
            graph.set_graph_property(name, value.clone())?;
        }

        Ok(graph)
    }

    /// JSON text of the persisted form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Reconstructs a graph from JSON text produced by [`Graph::to_json`].
    pub fn from_json(text: &str) -> Result<Self> {
        let obj: SerializedGraph = serde_json::from_str(text)?;
        Self::deserialize(&obj)
    }
}

impl GraphView for Graph {
    fn base(&self) -> &Graph {
        self
    }

    fn number_of_nodes(&self) -> usize {
        self.out_adj.len()
    }

    fn number_of_edges(&self) -> usize {
        self.num_edges
    }

    fn has_node(&self, uid: NodeId) -> bool {
        uid < self.out_adj.len()
    }

    fn has_edge(&self, edge: &Edge) -> bool {
        edge.key < self.edge_count(edge.src, edge.dst)
    }

    fn nodes(&self) -> Vec<NodeId> {
        (0..self.number_of_nodes()).collect()
    }

    fn edges(&self) -> Vec<Edge> {
        self.nodes()
            .into_iter()
            .flat_map(|uid| self.out_edges(uid))
            .collect()
    }

    fn successors(&self, uid: NodeId) -> Vec<NodeId> {
        match self.out_adj.get(uid) {
            Some(succ) => succ.keys().copied().collect(),
            None => Vec::new(),
        }
    }

    fn predecessors(&self, uid: NodeId) -> Vec<NodeId> {
        match self.in_adj.get(uid) {
            Some(pred) => pred.keys().copied().collect(),
            None => Vec::new(),
        }
    }

    fn out_edges(&self, uid: NodeId) -> Vec<Edge> {
        match self.out_adj.get(uid) {
            Some(succ) => succ
                .iter()
                .flat_map(|(&dst, &count)| (0..count).map(move |key| Edge::new(uid, dst, key)))
                .collect(),
            None => Vec::new(),
        }
    }

    fn in_edges(&self, uid: NodeId) -> Vec<Edge> {
        match self.in_adj.get(uid) {
            Some(pred) => pred
                .iter()
                .flat_map(|(&src, &count)| (0..count).map(move |key| Edge::new(src, uid, key)))
                .collect(),
            None => Vec::new(),
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Graph(|V|={}, |E|={})",
            self.number_of_nodes(),
            self.number_of_edges()
        )
    }
}

/// The self-describing persisted form of a [`Graph`].
///
/// Round trip guarantee: `Graph::deserialize(&g.serialize())` produces a
/// graph whose `serialize()` output equals `g.serialize()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedGraph {
    /// Total node count; ids are `0..nodes`.
    pub nodes: usize,
    /// Adjacency with multiplicity: `edges[src][dst]` is the number of
    /// parallel edges, whose keys are `0..count`.
    pub edges: BTreeMap<NodeId, BTreeMap<NodeId, u32>>,
    pub node_properties: BTreeMap<String, SerializedNodeProperty>,
    pub edge_properties: BTreeMap<String, SerializedEdgeProperty>,
    pub graph_properties: BTreeMap<String, PropValue>,
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn diamond() -> Graph {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3, plus a parallel 0 -> 1.
        let mut g = Graph::new();
        g.add_nodes(4);
        g.add_edge(0, 1).unwrap();
        g.add_edge(0, 2).unwrap();
        g.add_edge(1, 3).unwrap();
        g.add_edge(2, 3).unwrap();
        g.add_edge(0, 1).unwrap();
        g
    }

    #[test]
    fn test_sequential_node_ids() {
        let mut g = Graph::new();
        assert_eq!(g.add_node(), 0);
        assert_eq!(g.add_node(), 1);
        assert_eq!(g.add_nodes(3), vec![2, 3, 4]);
        assert_eq!(g.number_of_nodes(), 5);
    }

    #[test]
    fn test_parallel_edge_keys() {
        let mut g = Graph::new();
        g.add_nodes(2);
        assert_eq!(g.add_edge(0, 1).unwrap(), 0);
        assert_eq!(g.add_edge(0, 1).unwrap(), 1);
        assert_eq!(g.add_edge(0, 1).unwrap(), 2);
        assert_eq!(g.number_of_edges(), 3);
        assert!(g.has_edge(&Edge::new(0, 1, 2)));
        assert!(!g.has_edge(&Edge::new(0, 1, 3)));
    }

    #[test]
    fn test_add_edge_invalid_endpoint() {
        let mut g = Graph::new();
        g.add_node();
        assert!(matches!(g.add_edge(0, 5), Err(Error::InvalidNode(5))));
    }

    #[test]
    fn test_removal_unsupported() {
        let mut g = diamond();
        assert!(matches!(g.rem_node(0), Err(Error::Unsupported(_))));
        assert!(matches!(
            g.rem_edge(&Edge::new(0, 1, 0)),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_successors_distinct_sorted() {
        let g = diamond();
        // Parallel edges 0 -> 1 collapse into one successor entry.
        assert_eq!(g.successors(0), vec![1, 2]);
        assert_eq!(g.predecessors(3), vec![1, 2]);
        assert_eq!(
            g.out_edges(0),
            vec![Edge::new(0, 1, 0), Edge::new(0, 1, 1), Edge::new(0, 2, 0)]
        );
    }

    #[test]
    fn test_property_scopes_disjoint() {
        let mut g = diamond();
        g.add_node_property("turn", PropValue::Null).unwrap();
        assert!(matches!(
            g.add_edge_property("turn", PropValue::Null),
            Err(Error::DuplicateProperty(_))
        ));
        assert!(matches!(
            g.set_graph_property("turn", 1),
            Err(Error::DuplicateProperty(_))
        ));
        // Graph-scope values may be overwritten in place.
        g.set_graph_property("is_deterministic", true).unwrap();
        g.set_graph_property("is_deterministic", false).unwrap();
        assert_eq!(
            g.graph_prop("is_deterministic").unwrap(),
            &PropValue::Bool(false)
        );
    }

    #[test]
    fn test_invalid_key_is_error_not_default() {
        let mut g = diamond();
        g.add_node_property("final", PropValue::Bool(false)).unwrap();
        assert_eq!(g.node_prop("final", 2).unwrap(), &PropValue::Bool(false));
        assert!(matches!(g.node_prop("final", 99), Err(Error::InvalidNode(99))));
        assert!(matches!(
            g.set_node_prop("final", 99, true),
            Err(Error::InvalidNode(99))
        ));
    }

    #[test]
    fn test_unknown_property() {
        let g = diamond();
        assert!(matches!(
            g.node_prop("missing", 0),
            Err(Error::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_reverse_bfs() {
        let mut g = Graph::new();
        g.add_nodes(5);
        g.add_edges([(0, 1), (1, 2), (3, 2), (4, 4)]).unwrap();
        let reached = g.reverse_bfs([2]);
        assert_eq!(reached, BTreeSet::from([0, 1, 2, 3]));
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut g = diamond();
        g.add_node_property("state", PropValue::Null).unwrap();
        g.set_node_prop("state", 0, "init").unwrap();
        g.set_node_prop("state", 3, "goal").unwrap();
        g.add_edge_property("input", PropValue::Null).unwrap();
        g.set_edge_prop("input", &Edge::new(0, 1, 1), "a").unwrap();
        g.set_graph_property("is_deterministic", true).unwrap();

        let ser = g.serialize();
        let back = Graph::deserialize(&ser).unwrap();
        assert_eq!(back.serialize(), ser);

        let json = g.to_json().unwrap();
        let from_json = Graph::from_json(&json).unwrap();
        assert_eq!(from_json.serialize(), ser);
    }

    #[test]
    fn test_deserialize_rejects_stale_override() {
        let mut g = diamond();
        g.add_node_property("final", PropValue::Bool(false)).unwrap();
        let mut ser = g.serialize();
        ser.node_properties
            .get_mut("final")
            .unwrap()
            .overrides
            .insert(17, PropValue::Bool(true));
        assert!(matches!(
            Graph::deserialize(&ser),
            Err(Error::InvalidNode(17))
        ));
    }
}
