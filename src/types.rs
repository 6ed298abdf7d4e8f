//! Small value types shared across the graph engine and the solvers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::value::PropValue;

/// A node identifier.
///
/// Node ids are dense non-negative integers, assigned sequentially starting
/// at 0 and never reused. A graph with `n` nodes has exactly the ids `0..n`.
pub type NodeId = usize;

/// An edge of a multi-digraph, identified by the triple `(src, dst, key)`.
///
/// The `key` disambiguates parallel edges between the same `(src, dst)`
/// pair: the first edge added between two nodes has key 0, the next key 1,
/// and so on. Edge identity is structural, not content-addressed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(from = "(NodeId, NodeId, u32)", into = "(NodeId, NodeId, u32)")]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
    pub key: u32,
}

impl Edge {
    pub fn new(src: NodeId, dst: NodeId, key: u32) -> Self {
        Self { src, dst, key }
    }
}

impl From<(NodeId, NodeId, u32)> for Edge {
    fn from((src, dst, key): (NodeId, NodeId, u32)) -> Self {
        Self { src, dst, key }
    }
}

impl From<Edge> for (NodeId, NodeId, u32) {
    fn from(edge: Edge) -> Self {
        (edge.src, edge.dst, edge.key)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}->{}#{})", self.src, self.dst, self.key)
    }
}

/// One of the two players of a turn-based game.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Player {
    P1,
    P2,
}

impl Player {
    /// The other player.
    pub fn opponent(self) -> Self {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }

    /// The conventional integer encoding (1 or 2) used in property maps.
    pub fn id(self) -> i64 {
        match self {
            Player::P1 => 1,
            Player::P2 => 2,
        }
    }

    pub fn from_id(id: i64) -> Result<Self> {
        match id {
            1 => Ok(Player::P1),
            2 => Ok(Player::P2),
            _ => Err(Error::MalformedProperty(format!("player id {}", id))),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.id())
    }
}

impl From<Player> for PropValue {
    fn from(player: Player) -> Self {
        PropValue::Int(player.id())
    }
}

/// The iteration at which a node entered a winning set during a fixpoint
/// computation. `Infinite` means the node was never included.
///
/// Ranks are monotone non-decreasing across iterations, and `Infinite`
/// compares greater than every finite rank.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Rank {
    Finite(u32),
    Infinite,
}

impl Rank {
    pub fn is_finite(self) -> bool {
        matches!(self, Rank::Finite(_))
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Rank::Finite(a), Rank::Finite(b)) => a.cmp(b),
            (Rank::Finite(_), Rank::Infinite) => Ordering::Less,
            (Rank::Infinite, Rank::Finite(_)) => Ordering::Greater,
            (Rank::Infinite, Rank::Infinite) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Finite(r) => write!(f, "{}", r),
            Rank::Infinite => write!(f, "inf"),
        }
    }
}

impl From<Rank> for PropValue {
    fn from(rank: Rank) -> Self {
        match rank {
            Rank::Finite(r) => PropValue::Int(r as i64),
            Rank::Infinite => PropValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_display() {
        let edge = Edge::new(0, 3, 1);
        assert_eq!(edge.to_string(), "(0->3#1)");
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::P1.opponent(), Player::P2);
        assert_eq!(Player::P2.opponent(), Player::P1);
        assert_eq!(Player::P1.opponent().opponent(), Player::P1);
    }

    #[test]
    fn test_player_from_id() {
        assert_eq!(Player::from_id(1).unwrap(), Player::P1);
        assert_eq!(Player::from_id(2).unwrap(), Player::P2);
        assert!(Player::from_id(3).is_err());
    }

    #[test]
    fn test_rank_order() {
        assert!(Rank::Finite(0) < Rank::Finite(1));
        assert!(Rank::Finite(100) < Rank::Infinite);
        assert_eq!(Rank::Infinite, Rank::Infinite);
    }
}
