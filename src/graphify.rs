//! Expansion of implicit models into explicit graphs.
//!
//! [`explicit_graph`] consumes a [`TransitionSystem`] and produces a
//! [`Graph`] with one node per distinct state and one edge per
//! `(state, action, next-state)` transition. The resulting graph always
//! carries a `state` node property and an `input` edge property; `turn`,
//! `final` and `label` node properties are added when the model provides
//! them.
//!
//! Two expansion modes exist. *Unpointed* enumerates the full state space
//! returned by `states()`. *Pointed* explores only the states reachable
//! from `init_state()` via `delta`, creating nodes and edges on first
//! discovery; the result is never larger than the full expansion and is
//! the mode of choice when only reachable behavior matters.

use std::collections::{HashMap, VecDeque};

use log::{info, warn};

use crate::errors::{Error, Result};
use crate::graph::{Graph, GraphView};
use crate::model::{Next, TransitionSystem};
use crate::property::{EdgePropertyMap, NodePropertyMap};
use crate::types::{Edge, NodeId};
use crate::value::PropValue;

/// Expands `model` into an explicit graph.
///
/// With `pointed == true`, exploration starts at `init_state()` (an error
/// if the model has none) and visits reachable states only. Otherwise
/// every state of `states()` becomes a node.
///
/// Fails with [`Error::NonDeterminism`] if the model declares itself
/// deterministic but `delta` produces more than one distinct next state
/// for some `(state, action)` pair.
pub fn explicit_graph<M: TransitionSystem>(model: &M, pointed: bool) -> Result<Graph> {
    let mut expansion = Expansion::new(model);

    if pointed {
        expansion.expand_pointed()?;
    } else {
        expansion.expand_unpointed()?;
    }

    expansion.finish()
}

struct Expansion<'m, M: TransitionSystem> {
    model: &'m M,
    graph: Graph,
    /// Node id -> state, in creation order.
    states: Vec<M::State>,
    state2node: HashMap<M::State, NodeId>,
    input: EdgePropertyMap<PropValue>,
}

impl<'m, M: TransitionSystem> Expansion<'m, M> {
    fn new(model: &'m M) -> Self {
        Self {
            model,
            graph: Graph::new(),
            states: Vec::new(),
            state2node: HashMap::new(),
            input: EdgePropertyMap::new(PropValue::Null),
        }
    }

    fn intern(&mut self, state: M::State) -> NodeId {
        if let Some(&uid) = self.state2node.get(&state) {
            return uid;
        }
        let uid = self.graph.add_node();
        self.state2node.insert(state.clone(), uid);
        self.states.push(state);
        uid
    }

    /// The distinct next states of one `(state, action)` application,
    /// checked against the model's determinism claim.
    fn next_states(&self, uid: NodeId, action: &M::Action) -> Result<Vec<M::State>> {
        let state = &self.states[uid];
        let mut targets = Vec::new();
        for next in self.model.delta(state, action).into_vec() {
            if !targets.contains(&next) {
                targets.push(next);
            }
        }

        if self.model.is_deterministic() && targets.len() > 1 {
            return Err(Error::NonDeterminism {
                state: format!("{:?}", state),
                action: format!("{:?}", action),
            });
        }

        Ok(targets)
    }

    fn add_transition(&mut self, uid: NodeId, vid: NodeId, action: &M::Action) -> Result<()> {
        let key = self.graph.add_edge(uid, vid)?;
        self.input.set(Edge::new(uid, vid, key), action.clone().into());
        Ok(())
    }

    fn expand_unpointed(&mut self) -> Result<()> {
        for state in self.model.states() {
            if self.state2node.contains_key(&state) {
                warn!("duplicate state {:?} in states(); ignored", state);
                continue;
            }
            self.intern(state);
        }

        let actions = self.model.actions();
        if actions.is_empty() {
            warn!("action set is empty; no edges will be added");
        }

        for uid in 0..self.states.len() {
            for action in &actions {
                for next in self.next_states(uid, action)? {
                    let target = self.state2node.get(&next).copied();
                    match target {
                        Some(vid) => self.add_transition(uid, vid, action)?,
                        None => warn!(
                            "no edge added for state={:?}, action={:?}: next state {:?} is not in states()",
                            self.states[uid], action, next
                        ),
                    }
                }
            }
        }

        Ok(())
    }

    fn expand_pointed(&mut self) -> Result<()> {
        let init = self.model.init_state().ok_or(Error::NotPointed)?;
        let actions = self.model.actions();
        if actions.is_empty() {
            warn!("action set is empty; no edges will be added");
        }

        let mut queue = VecDeque::new();
        queue.push_back(self.intern(init));

        while let Some(uid) = queue.pop_front() {
            for action in &actions {
                for next in self.next_states(uid, action)? {
                    let known = self.state2node.contains_key(&next);
                    let vid = self.intern(next);
                    if !known {
                        queue.push_back(vid);
                    }
                    self.add_transition(uid, vid, action)?;
                }
            }
        }

        Ok(())
    }

    fn finish(self) -> Result<Graph> {
        let Expansion {
            model,
            mut graph,
            states,
            input,
            ..
        } = self;

        let mut state_prop = NodePropertyMap::new(PropValue::Null);
        for (uid, state) in states.iter().enumerate() {
            state_prop.set(uid, state.clone().into());
        }
        graph.insert_node_property("state", state_prop)?;
        graph.insert_edge_property("input", input)?;

        let actions: Vec<PropValue> = model.actions().into_iter().map(Into::into).collect();
        graph.set_graph_property("actions", actions)?;
        graph.set_graph_property("is_deterministic", model.is_deterministic())?;

        let turns: Vec<_> = states.iter().map(|s| model.turn(s)).collect();
        if turns.iter().any(Option::is_some) {
            let mut turn_prop = NodePropertyMap::new(PropValue::Null);
            for (uid, turn) in turns.iter().enumerate() {
                if let Some(player) = turn {
                    turn_prop.set(uid, (*player).into());
                }
            }
            graph.insert_node_property("turn", turn_prop)?;
            graph.set_graph_property("is_turn_based", turns.iter().all(Option::is_some))?;
        }

        let finals: Vec<_> = states.iter().map(|s| model.is_final(s)).collect();
        if finals.iter().any(Option::is_some) {
            let mut final_prop = NodePropertyMap::new(PropValue::Bool(false));
            for (uid, value) in finals.iter().enumerate() {
                if let Some(is_final) = value {
                    final_prop.set(uid, PropValue::Bool(*is_final));
                }
            }
            graph.insert_node_property("final", final_prop)?;
        }

        let labels: Vec<_> = states.iter().map(|s| model.label(s)).collect();
        if labels.iter().any(Option::is_some) {
            let mut label_prop = NodePropertyMap::new(PropValue::List(Vec::new()));
            for (uid, value) in labels.iter().enumerate() {
                if let Some(atoms) = value {
                    label_prop.set(
                        uid,
                        PropValue::List(atoms.iter().map(|a| a.as_str().into()).collect()),
                    );
                }
            }
            graph.insert_node_property("label", label_prop)?;
        }

        info!(
            "expanded model into {} ({} states, {} transitions)",
            graph,
            graph.number_of_nodes(),
            graph.number_of_edges()
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::graph::GraphView;
    use crate::types::{Edge, Player};

    /// A counter modulo `n`: `inc` steps forward, `stay` loops.
    struct ModCounter {
        n: i64,
        pointed: bool,
    }

    impl TransitionSystem for ModCounter {
        type State = i64;
        type Action = &'static str;

        fn states(&self) -> Vec<i64> {
            (0..self.n).collect()
        }

        fn actions(&self) -> Vec<&'static str> {
            vec!["inc", "stay"]
        }

        fn delta(&self, state: &i64, action: &&'static str) -> Next<i64> {
            match *action {
                "inc" => Next::One((state + 1) % self.n),
                "stay" => Next::One(*state),
                _ => Next::None,
            }
        }

        fn init_state(&self) -> Option<i64> {
            if self.pointed {
                Some(0)
            } else {
                None
            }
        }

        fn turn(&self, state: &i64) -> Option<Player> {
            Some(if state % 2 == 0 { Player::P1 } else { Player::P2 })
        }

        fn is_final(&self, state: &i64) -> Option<bool> {
            Some(*state == self.n - 1)
        }
    }

    #[test]
    fn test_unpointed_expansion() {
        let model = ModCounter { n: 3, pointed: false };
        let graph = explicit_graph(&model, false).unwrap();

        assert_eq!(graph.number_of_nodes(), 3);
        // Two actions per state.
        assert_eq!(graph.number_of_edges(), 6);
        assert_eq!(graph.node_prop("state", 1).unwrap(), &PropValue::Int(1));
        assert_eq!(
            graph.edge_prop("input", &Edge::new(0, 1, 0)).unwrap(),
            &PropValue::Str("inc".to_string())
        );
        assert_eq!(graph.node_prop("turn", 2).unwrap(), &PropValue::Int(1));
        assert_eq!(graph.node_prop("final", 2).unwrap(), &PropValue::Bool(true));
        assert_eq!(
            graph.graph_prop("is_deterministic").unwrap(),
            &PropValue::Bool(true)
        );
        assert_eq!(
            graph.graph_prop("is_turn_based").unwrap(),
            &PropValue::Bool(true)
        );
    }

    /// Only even states are reachable from 0 by steps of two.
    struct EvenWalk;

    impl TransitionSystem for EvenWalk {
        type State = i64;
        type Action = &'static str;

        fn states(&self) -> Vec<i64> {
            (0..10).collect()
        }

        fn actions(&self) -> Vec<&'static str> {
            vec!["step"]
        }

        fn delta(&self, state: &i64, _action: &&'static str) -> Next<i64> {
            if *state + 2 < 10 {
                Next::One(state + 2)
            } else {
                Next::None
            }
        }

        fn init_state(&self) -> Option<i64> {
            Some(0)
        }
    }

    #[test]
    fn test_pointed_visits_reachable_only() {
        let graph = explicit_graph(&EvenWalk, true).unwrap();
        assert_eq!(graph.number_of_nodes(), 5);
        assert_eq!(graph.node_prop("state", 4).unwrap(), &PropValue::Int(8));

        let full = explicit_graph(&EvenWalk, false).unwrap();
        assert_eq!(full.number_of_nodes(), 10);
    }

    #[test]
    fn test_pointed_requires_init_state() {
        let model = ModCounter { n: 3, pointed: false };
        assert!(matches!(
            explicit_graph(&model, true),
            Err(Error::NotPointed)
        ));
    }

    /// Claims determinism but branches on action "flip".
    struct LyingModel;

    impl TransitionSystem for LyingModel {
        type State = i64;
        type Action = &'static str;

        fn states(&self) -> Vec<i64> {
            vec![0, 1, 2]
        }

        fn actions(&self) -> Vec<&'static str> {
            vec!["flip"]
        }

        fn delta(&self, state: &i64, _action: &&'static str) -> Next<i64> {
            if *state == 0 {
                Next::Many(vec![1, 2])
            } else {
                Next::None
            }
        }
    }

    #[test]
    fn test_non_determinism_detected() {
        let result = explicit_graph(&LyingModel, false);
        match result {
            Err(Error::NonDeterminism { state, action }) => {
                assert_eq!(state, "0");
                assert_eq!(action, "\"flip\"");
            }
            other => panic!("expected NonDeterminism, got {:?}", other.map(|g| g.to_string())),
        }
    }

    /// The same branching model, honestly declared.
    struct HonestModel;

    impl TransitionSystem for HonestModel {
        type State = i64;
        type Action = &'static str;

        fn states(&self) -> Vec<i64> {
            vec![0, 1, 2]
        }

        fn actions(&self) -> Vec<&'static str> {
            vec!["flip"]
        }

        fn delta(&self, state: &i64, _action: &&'static str) -> Next<i64> {
            if *state == 0 {
                Next::Many(vec![1, 2, 1])
            } else {
                Next::None
            }
        }

        fn is_deterministic(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_non_deterministic_expansion() {
        let graph = explicit_graph(&HonestModel, false).unwrap();
        // The duplicate next state collapses: one edge per distinct target.
        assert_eq!(graph.number_of_edges(), 2);
        assert_eq!(graph.successors(0), vec![1, 2]);
    }
}
