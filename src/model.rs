//! Implicit transition-system models.
//!
//! A model describes a game or decision process by its state space,
//! action set and transition function instead of an explicit graph.
//! [`crate::graphify::explicit_graph`] expands a model into a
//! [`Graph`][crate::graph::Graph]; everything downstream (solvers,
//! serialization) works on the explicit form only.

use std::fmt::Debug;
use std::hash::Hash;

use crate::types::Player;
use crate::value::PropValue;

/// The result of one application of a transition function.
///
/// `None` means "no transition"; `Many` carries the possible next states
/// of a non-deterministic step (its elements are treated as a set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next<S> {
    None,
    One(S),
    Many(Vec<S>),
}

impl<S> Next<S> {
    pub fn is_none(&self) -> bool {
        matches!(self, Next::None)
    }

    /// The next states as a vector (possibly empty).
    pub fn into_vec(self) -> Vec<S> {
        match self {
            Next::None => Vec::new(),
            Next::One(s) => vec![s],
            Next::Many(states) => states,
        }
    }
}

impl<S> From<Option<S>> for Next<S> {
    fn from(value: Option<S>) -> Self {
        match value {
            Some(s) => Next::One(s),
            None => Next::None,
        }
    }
}

impl<S> From<Vec<S>> for Next<S> {
    fn from(states: Vec<S>) -> Self {
        Next::Many(states)
    }
}

/// An implicit transition system: the model interface consumed by
/// [`crate::graphify::explicit_graph`].
///
/// Only `states`, `actions` and `delta` are mandatory. The `Option`
/// hooks (`init_state`, `turn`, `is_final`, `label`) advertise
/// capabilities: a hook returning `Some` for the model's states causes
/// the corresponding property map to be populated on the explicit graph.
pub trait TransitionSystem {
    type State: Clone + Eq + Hash + Debug + Into<PropValue>;
    type Action: Clone + Eq + Hash + Debug + Into<PropValue>;

    /// The state space, in a fixed enumeration order.
    fn states(&self) -> Vec<Self::State>;

    /// The action (input) alphabet.
    fn actions(&self) -> Vec<Self::Action>;

    /// The transition function.
    fn delta(&self, state: &Self::State, action: &Self::Action) -> Next<Self::State>;

    /// The initial state, if the model is pointed.
    fn init_state(&self) -> Option<Self::State> {
        None
    }

    /// Whether `delta` is claimed to yield at most one next state per
    /// `(state, action)` pair. Violations are detected during expansion.
    fn is_deterministic(&self) -> bool {
        true
    }

    /// The player controlling `state` in a turn-based game.
    fn turn(&self, _state: &Self::State) -> Option<Player> {
        None
    }

    /// Whether `state` belongs to the final (target) set.
    fn is_final(&self, _state: &Self::State) -> Option<bool> {
        None
    }

    /// The atomic propositions holding at `state`.
    fn label(&self, _state: &Self::State) -> Option<Vec<String>> {
        None
    }
}

/// An external automaton, e.g. produced from a temporal-logic formula.
///
/// The crate only consumes automata (for product constructions built by
/// callers); it never builds one itself.
pub trait Automaton {
    type State: Clone + Eq + Hash + Debug;

    fn states(&self) -> Vec<Self::State>;

    /// The atomic propositions the automaton reads.
    fn atoms(&self) -> Vec<String>;

    /// Transition on a symbolic input: the set of atoms currently true.
    fn delta(&self, state: &Self::State, symbol: &[String]) -> Next<Self::State>;

    fn init_state(&self) -> Self::State;

    /// The acceptance sets `state` belongs to.
    fn acceptance(&self, state: &Self::State) -> Vec<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_conversions() {
        let one: Next<i32> = Some(3).into();
        assert_eq!(one, Next::One(3));
        assert_eq!(one.into_vec(), vec![3]);

        let none: Next<i32> = None.into();
        assert!(none.is_none());
        assert_eq!(none.into_vec(), Vec::<i32>::new());

        let many: Next<i32> = vec![1, 2].into();
        assert_eq!(many.into_vec(), vec![1, 2]);
    }
}
