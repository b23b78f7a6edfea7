/*
    This module is for finite automata built from, and turned back into,
    regular grammars
*/

mod dfa;
mod regular;
pub mod render;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use itertools::Itertools;

use crate::error_handling::ErrorType;
use crate::grammar::{describe, GrammarErrorType, Symbol};

/// A state of an automaton.
///
/// Automata built from a grammar have one `Named` state per nonterminal plus
/// `Accept` when some rule ends in a lone terminal. Determinization turns each
/// reachable set of states into a single `Subset` state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State<T> {
    Named(T),
    // Implicit accepting state, distinct from every named state
    Accept,
    Subset(BTreeSet<State<T>>),
}

impl<T: Display> Display for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Named(name) => write!(f, "{}", name),
            State::Accept => write!(f, "ε"),
            State::Subset(states) => write!(f, "{{{}}}", states.iter().join(", ")),
        }
    }
}

// Destinations keyed by source state, then by symbol
pub type Transitions<T> = BTreeMap<State<T>, BTreeMap<T, BTreeSet<State<T>>>>;

#[derive(Debug, PartialEq, Clone)]
pub enum AutomatonErrorType {
    // A transition, the start or a final state is not one of the states
    UnknownState(String),
    // A transition is labelled with a symbol outside the alphabet
    UnknownSymbol(String),
    // The operation needs exactly one destination per transition
    NonDeterministic,
    // A state has no symbol that could name a nonterminal
    UnnamedState(String),
    // The automaton does not describe a valid grammar
    Grammar(GrammarErrorType),
}

impl ErrorType for AutomatonErrorType {}

impl Display for AutomatonErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutomatonErrorType::UnknownState(state) => write!(f, "State {} is not part of the automaton", state),
            AutomatonErrorType::UnknownSymbol(symbol) => write!(f, "Symbol {} is not part of the alphabet", symbol),
            AutomatonErrorType::NonDeterministic => write!(f, "The automaton is not deterministic"),
            AutomatonErrorType::UnnamedState(state) => write!(f, "State {} cannot be turned into a nonterminal", state),
            AutomatonErrorType::Grammar(error) => write!(f, "{}", error),
        }
    }
}

impl From<GrammarErrorType> for AutomatonErrorType {
    fn from(error: GrammarErrorType) -> Self {
        AutomatonErrorType::Grammar(error)
    }
}

pub type Result<T> = std::result::Result<T, AutomatonErrorType>;

/// A finite automaton: states, alphabet, start state, transition relation and
/// final states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton<T: Symbol> {
    states: BTreeSet<State<T>>,
    alphabet: BTreeSet<T>,
    start: State<T>,
    transitions: Transitions<T>,
    finals: BTreeSet<State<T>>,
}

impl<T: Symbol> Automaton<T> {
    pub fn new(
        states: BTreeSet<State<T>>,
        alphabet: BTreeSet<T>,
        start: State<T>,
        transitions: Transitions<T>,
        finals: BTreeSet<State<T>>,
    ) -> Result<Self> {
        let unknown_state = |state: &State<T>| AutomatonErrorType::UnknownState(describe(state));

        if !states.contains(&start) {
            return Err(unknown_state(&start));
        }
        if let Some(state) = finals.iter().find(|state| !states.contains(*state)) {
            return Err(unknown_state(state));
        }

        for (source, by_symbol) in &transitions {
            if !states.contains(source) {
                return Err(unknown_state(source));
            }
            for (symbol, destinations) in by_symbol {
                if !alphabet.contains(symbol) {
                    return Err(AutomatonErrorType::UnknownSymbol(describe(symbol)));
                }
                if let Some(state) = destinations.iter().find(|state| !states.contains(*state)) {
                    return Err(unknown_state(state));
                }
            }
        }

        // Empty entries are not transitions; drop them so equality stays structural
        let transitions = transitions.into_iter()
            .map(|(source, by_symbol)| {
                let by_symbol: BTreeMap<_, _> = by_symbol.into_iter()
                    .filter(|(_, destinations)| !destinations.is_empty())
                    .collect();
                (source, by_symbol)
            })
            .filter(|(_, by_symbol)| !by_symbol.is_empty())
            .collect();

        Ok(Automaton {
            states,
            alphabet,
            start,
            transitions,
            finals,
        })
    }

    pub fn states(&self) -> &BTreeSet<State<T>> {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<T> {
        &self.alphabet
    }

    pub fn start(&self) -> &State<T> {
        &self.start
    }

    pub fn transitions(&self) -> &Transitions<T> {
        &self.transitions
    }

    pub fn transition(&self, state: &State<T>, symbol: &T) -> Option<&BTreeSet<State<T>>> {
        self.transitions.get(state).and_then(|by_symbol| by_symbol.get(symbol))
    }

    pub fn final_states(&self) -> &BTreeSet<State<T>> {
        &self.finals
    }

    pub fn nonfinal_states(&self) -> impl Iterator<Item = &State<T>> + '_ {
        self.states.difference(&self.finals)
    }

    /// Every transition as `(source, destination, label)`, one per destination.
    pub fn edges(&self) -> Vec<(&State<T>, &State<T>, &T)> {
        self.transitions
            .iter()
            .flat_map(|(source, by_symbol)| {
                by_symbol.iter().flat_map(move |(symbol, destinations)| {
                    destinations.iter().map(move |destination| (source, destination, symbol))
                })
            })
            .collect()
    }

    pub fn is_deterministic(&self) -> bool {
        self.transitions
            .values()
            .flat_map(BTreeMap::values)
            .all(|destinations| destinations.len() == 1)
    }

    /// Runs the automaton on `word`, following every possible path at once.
    pub fn accepts(&self, word: &[T]) -> bool {
        let mut current = BTreeSet::from([&self.start]);
        for symbol in word {
            current = current.into_iter()
                .filter_map(|state| self.transition(state, symbol))
                .flatten()
                .collect();
            if current.is_empty() {
                return false;
            }
        }
        current.into_iter().any(|state| self.finals.contains(state))
    }
}

impl<T: Symbol + Display> Display for Automaton<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "S = {{{}}}", self.states.iter().join(", "))?;
        writeln!(f, "A = {{{}}}", self.alphabet.iter().join(", "))?;
        writeln!(f, "s0 = {}", self.start)?;
        for (source, by_symbol) in &self.transitions {
            for (symbol, destinations) in by_symbol {
                writeln!(f, "d({}, {}) = {{{}}}", source, symbol, destinations.iter().join(", "))?;
            }
        }
        write!(f, "F = {{{}}}", self.finals.iter().join(", "))
    }
}
