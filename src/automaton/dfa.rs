/*
    Subset construction and deterministic acceptance
*/

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use super::{Automaton, AutomatonErrorType, Result, State, Transitions};
use crate::grammar::Symbol;

impl<T: Symbol> Automaton<T> {
    // Every state reachable from any state in `states` by reading `symbol`
    fn move_on_symbol(&self, states: &BTreeSet<State<T>>, symbol: &T) -> BTreeSet<State<T>> {
        states.iter()
            .filter_map(|state| self.transition(state, symbol))
            .flatten()
            .cloned()
            .collect()
    }

    /// Converts the automaton into an equivalent deterministic one with the
    /// powerset construction.
    ///
    /// Each state of the result is the `Subset` of original states it stands
    /// for, starting from `{s0}`. Subsets with no way out are not created, so
    /// a missing transition means rejection. An automaton that is already
    /// deterministic is returned as it is.
    pub fn to_dfa(&self) -> Automaton<T> {
        if self.is_deterministic() {
            return self.clone();
        }

        let initial = BTreeSet::from([self.start.clone()]);
        let mut discovered = BTreeSet::from([initial.clone()]);
        let mut worklist = vec![initial.clone()];
        let mut transitions = Transitions::new();

        while let Some(current) = worklist.pop() {
            let mut by_symbol = BTreeMap::new();

            for symbol in &self.alphabet {
                let next = self.move_on_symbol(&current, symbol);
                if next.is_empty() {
                    continue;
                }

                if discovered.insert(next.clone()) {
                    trace!("new subset of {} states", next.len());
                    worklist.push(next.clone());
                }
                by_symbol.insert(symbol.clone(), BTreeSet::from([State::Subset(next)]));
            }

            if !by_symbol.is_empty() {
                transitions.insert(State::Subset(current), by_symbol);
            }
        }

        let finals = discovered.iter()
            .filter(|subset| !subset.is_disjoint(&self.finals))
            .cloned()
            .map(State::Subset)
            .collect();
        let states: BTreeSet<State<T>> = discovered.into_iter().map(State::Subset).collect();

        debug!("DFA: {} subsets from {} states", states.len(), self.states.len());
        Automaton {
            states,
            alphabet: self.alphabet.clone(),
            start: State::Subset(initial),
            transitions,
            finals,
        }
    }

    /// Decides whether a deterministic automaton accepts `word`.
    pub fn verify(&self, word: &[T]) -> Result<bool> {
        if !self.is_deterministic() {
            return Err(AutomatonErrorType::NonDeterministic);
        }

        let mut state = &self.start;
        for symbol in word {
            match self.transition(state, symbol).and_then(|destinations| destinations.first()) {
                Some(next) => state = next,
                None => return Ok(false),
            }
        }
        Ok(self.finals.contains(state))
    }
}
