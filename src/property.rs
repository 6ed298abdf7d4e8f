//! Sparse property maps with declared defaults.
//!
//! A property map associates node ids (or edge triples) with values, but
//! only physically stores the values that differ from the map's declared
//! default. Reading a key that was never set yields the default. Key
//! validity is not known to the map itself: the owning [`Graph`] checks
//! node/edge membership at its boundary and rejects invalid keys with an
//! error instead of a default.
//!
//! Maps registered in a graph's property table are owned by that graph;
//! ownership moves in at registration and never leaves, so a map is bound
//! to exactly one graph for its whole life.
//!
//! [`Graph`]: crate::graph::Graph

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{Edge, NodeId};
use crate::value::PropValue;

/// A sparse map from node ids to values of type `V`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePropertyMap<V> {
    default: V,
    stored: HashMap<NodeId, V>,
}

impl<V: Clone + PartialEq> NodePropertyMap<V> {
    pub fn new(default: V) -> Self {
        Self {
            default,
            stored: HashMap::new(),
        }
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    /// The value for `uid`, or the default if never set.
    ///
    /// The caller is responsible for `uid` being a valid node of the
    /// owning graph; use the graph's checked accessors otherwise.
    pub fn get(&self, uid: NodeId) -> &V {
        self.stored.get(&uid).unwrap_or(&self.default)
    }

    /// Sets the value for `uid`.
    ///
    /// Writing the default value stores nothing (and clears a previously
    /// stored entry), keeping the map sparse.
    pub fn set(&mut self, uid: NodeId, value: V) {
        if value == self.default {
            self.stored.remove(&uid);
        } else {
            self.stored.insert(uid, value);
        }
    }

    /// Number of physically stored (non-default) entries.
    pub fn stored_len(&self) -> usize {
        self.stored.len()
    }

    pub fn is_stored(&self, uid: NodeId) -> bool {
        self.stored.contains_key(&uid)
    }

    /// Stored entries in ascending node order.
    pub fn iter_stored(&self) -> impl Iterator<Item = (NodeId, &V)> {
        let mut entries: Vec<_> = self.stored.iter().map(|(&uid, v)| (uid, v)).collect();
        entries.sort_by_key(|&(uid, _)| uid);
        entries.into_iter()
    }
}

impl NodePropertyMap<PropValue> {
    pub fn to_serialized(&self) -> SerializedNodeProperty {
        SerializedNodeProperty {
            default: self.default.clone(),
            overrides: self.iter_stored().map(|(uid, v)| (uid, v.clone())).collect(),
        }
    }

    pub fn from_serialized(obj: &SerializedNodeProperty) -> Self {
        let mut map = Self::new(obj.default.clone());
        for (&uid, value) in &obj.overrides {
            map.set(uid, value.clone());
        }
        map
    }
}

/// A sparse map from edge triples to values of type `V`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePropertyMap<V> {
    default: V,
    stored: HashMap<Edge, V>,
}

impl<V: Clone + PartialEq> EdgePropertyMap<V> {
    pub fn new(default: V) -> Self {
        Self {
            default,
            stored: HashMap::new(),
        }
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    /// The value for `edge`, or the default if never set.
    pub fn get(&self, edge: &Edge) -> &V {
        self.stored.get(edge).unwrap_or(&self.default)
    }

    /// Sets the value for `edge`, storing nothing if it equals the default.
    pub fn set(&mut self, edge: Edge, value: V) {
        if value == self.default {
            self.stored.remove(&edge);
        } else {
            self.stored.insert(edge, value);
        }
    }

    pub fn stored_len(&self) -> usize {
        self.stored.len()
    }

    pub fn is_stored(&self, edge: &Edge) -> bool {
        self.stored.contains_key(edge)
    }

    /// Stored entries in ascending `(src, dst, key)` order.
    pub fn iter_stored(&self) -> impl Iterator<Item = (Edge, &V)> {
        let mut entries: Vec<_> = self.stored.iter().map(|(&e, v)| (e, v)).collect();
        entries.sort_by_key(|&(e, _)| e);
        entries.into_iter()
    }
}

impl EdgePropertyMap<PropValue> {
    pub fn to_serialized(&self) -> SerializedEdgeProperty {
        SerializedEdgeProperty {
            default: self.default.clone(),
            overrides: self
                .iter_stored()
                .map(|(edge, value)| EdgePropertyOverride {
                    edge,
                    value: value.clone(),
                })
                .collect(),
        }
    }

    pub fn from_serialized(obj: &SerializedEdgeProperty) -> Self {
        let mut map = Self::new(obj.default.clone());
        for item in &obj.overrides {
            map.set(item.edge, item.value.clone());
        }
        map
    }
}

/// Persisted form of a node property map: the default plus the explicit
/// overrides, keyed by node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNodeProperty {
    pub default: PropValue,
    pub overrides: BTreeMap<NodeId, PropValue>,
}

/// Persisted form of an edge property map. Edges serialize as
/// `[src, dst, key]` triples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedEdgeProperty {
    pub default: PropValue,
    pub overrides: Vec<EdgePropertyOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgePropertyOverride {
    pub edge: Edge,
    pub value: PropValue,
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_unset_key_reads_default() {
        let map: NodePropertyMap<PropValue> = NodePropertyMap::new(PropValue::Int(0));
        assert_eq!(map.get(7), &PropValue::Int(0));
        assert_eq!(map.stored_len(), 0);
    }

    #[test]
    fn test_default_write_stores_nothing() {
        let mut map = NodePropertyMap::new(PropValue::Bool(false));
        map.set(3, PropValue::Bool(false));
        assert_eq!(map.stored_len(), 0);

        map.set(3, PropValue::Bool(true));
        assert_eq!(map.stored_len(), 1);

        // Writing the default again clears the entry.
        map.set(3, PropValue::Bool(false));
        assert_eq!(map.stored_len(), 0);
        assert_eq!(map.get(3), &PropValue::Bool(false));
    }

    #[test]
    fn test_edge_map_sparsity() {
        let mut map = EdgePropertyMap::new(PropValue::Null);
        let e = Edge::new(0, 1, 0);
        map.set(e, PropValue::Str("alpha".to_string()));
        assert_eq!(map.get(&e), &PropValue::Str("alpha".to_string()));
        assert_eq!(map.get(&Edge::new(0, 1, 1)), &PropValue::Null);
        assert_eq!(map.stored_len(), 1);
    }

    #[test]
    fn test_serialized_round_trip() {
        let mut map = NodePropertyMap::new(PropValue::Int(-1));
        map.set(0, PropValue::Int(4));
        map.set(2, PropValue::Int(9));

        let ser = map.to_serialized();
        let back = NodePropertyMap::from_serialized(&ser);
        assert_eq!(map, back);
        assert_eq!(ser, back.to_serialized());
    }
}
