use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::{Automaton, AutomatonErrorType, Result, State, Transitions};
use crate::grammar::{self, describe, Grammar, Productions, Symbol};

impl<T: Symbol> Grammar<T> {
    /// Reads a strictly right-regular grammar as a nondeterministic automaton.
    ///
    /// Each rule becomes one piece of the automaton:
    ///     A -> aB    transition (A, a) -> B
    ///     A -> a     transition (A, a) -> ε, and ε is final
    ///     A -> ε     A is final
    pub fn to_nfa(&self) -> grammar::Result<Automaton<T>> {
        self.ensure_regular()?;

        let mut transitions = Transitions::new();
        let mut alphabet = BTreeSet::new();
        let mut finals = BTreeSet::new();

        for (head, tail) in self.rules() {
            let source = State::Named(head[0].clone());
            let (symbol, destination) = match tail.as_slice() {
                [] => {
                    finals.insert(source);
                    continue;
                }
                [symbol] => {
                    finals.insert(State::Accept);
                    (symbol, State::Accept)
                }
                [symbol, next] => (symbol, State::Named(next.clone())),
                // Unreachable once the grammar is known to be regular
                _ => continue,
            };

            alphabet.insert(symbol.clone());
            transitions
                .entry(source)
                .or_insert_with(BTreeMap::new)
                .entry(symbol.clone())
                .or_insert_with(BTreeSet::new)
                .insert(destination);
        }

        let mut states: BTreeSet<State<T>> = self.nonterminals().iter().cloned().map(State::Named).collect();
        states.extend(finals.iter().cloned());

        debug!("NFA: {} states, {} symbols, {} final", states.len(), alphabet.len(), finals.len());
        Ok(Automaton {
            states,
            alphabet,
            start: State::Named(self.start().clone()),
            transitions,
            finals,
        })
    }
}

fn name_of<T: Symbol>(state: &State<T>) -> Result<T> {
    match state {
        State::Named(name) => Ok(name.clone()),
        other => Err(AutomatonErrorType::UnnamedState(describe(other))),
    }
}

impl<T: Symbol> Automaton<T> {
    /// Reads the automaton back as a right-regular grammar, the inverse of
    /// `Grammar::to_nfa`.
    ///
    /// Every state except the implicit accepting one becomes a nonterminal,
    /// so states produced by determinization cannot be converted.
    pub fn to_grammar(&self) -> Result<Grammar<T>> {
        let mut productions = Productions::new();
        let mut terminals = BTreeSet::new();

        for (source, destination, symbol) in self.edges() {
            let head = vec![name_of(source)?];
            let tail = match destination {
                State::Accept => vec![symbol.clone()],
                state => vec![symbol.clone(), name_of(state)?],
            };
            terminals.insert(symbol.clone());
            productions
                .entry(head)
                .or_insert_with(BTreeSet::new)
                .insert(tail);
        }

        for state in self.finals.iter().filter(|state| **state != State::Accept) {
            productions
                .entry(vec![name_of(state)?])
                .or_insert_with(BTreeSet::new)
                .insert(Vec::new());
        }

        let nonterminals = self.states
            .iter()
            .filter(|state| **state != State::Accept)
            .map(name_of)
            .collect::<Result<BTreeSet<T>>>()?;

        Ok(Grammar::new(nonterminals, terminals, productions, name_of(&self.start)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::tests::*;
    use crate::grammar::tests::{phrase, productions, regular_grammar, symbols};
    use crate::grammar::{GrammarErrorType, GrammarType};

    #[test]
    fn grammar_to_nfa() {
        let nfa = regular_grammar().to_nfa().unwrap();

        assert_eq!(nfa, regular_nfa());
        assert_eq!(nfa.states(), &states(&["A", "B", "ε"]));
        assert_eq!(nfa.alphabet(), &alphabet(&["a", "b"]));
        assert_eq!(nfa.start(), &named("A"));
        assert_eq!(nfa.final_states(), &states(&["A", "ε"]));
        assert!(!nfa.is_deterministic());
    }

    #[test]
    fn deterministic_grammar_to_nfa() {
        let g = Grammar::new(
            symbols(&["A", "B"]),
            symbols(&["a", "b"]),
            productions(&[("A", "b B | a A | "), ("B", "b")]),
            "A".to_string()
        ).unwrap();

        assert!(g.to_nfa().unwrap().is_deterministic());
    }

    #[test]
    fn nfa_requires_regular_grammar() {
        let g = Grammar::new(
            symbols(&["A"]),
            symbols(&["a"]),
            productions(&[("A", "a A a | ")]),
            "A".to_string()
        ).unwrap();

        assert_eq!(g.to_nfa(), Err(GrammarErrorType::NotRegular(GrammarType::ContextFree)));
    }

    #[test]
    fn nfa_to_grammar_round_trip() {
        let g = regular_grammar();
        assert_eq!(g.to_nfa().unwrap().to_grammar().unwrap(), g);
    }

    #[test]
    fn unused_nonterminals_survive_round_trip() {
        let g = Grammar::new(
            symbols(&["S", "T", "U"]),
            symbols(&["x", "y"]),
            productions(&[("S", "x T | y"), ("T", "x S | ")]),
            "S".to_string()
        ).unwrap();
        let back = g.to_nfa().unwrap().to_grammar().unwrap();

        assert_eq!(back, g);
        assert!(back.alternatives(&"U".to_string()).is_none());
        assert_eq!(back.alternatives(&"S".to_string()).unwrap(), &[phrase("x T"), phrase("y")].into_iter().collect::<BTreeSet<_>>());
    }

    #[test]
    fn determinized_states_have_no_name() {
        let dfa = regular_nfa().to_dfa();
        assert_eq!(
            dfa.to_grammar(),
            Err(AutomatonErrorType::UnnamedState(describe(&subset(&["A"]))))
        );
    }

    #[test]
    fn clashing_state_and_symbol() {
        let nfa = Automaton::new(
            states(&["q", "a"]),
            alphabet(&["a"]),
            named("q"),
            transitions(&[(named("q"), "a", states(&["a"]))]),
            states(&["a"]),
        ).unwrap();

        assert_eq!(
            nfa.to_grammar(),
            Err(AutomatonErrorType::Grammar(GrammarErrorType::OverlappingSymbols("\"a\"".to_string())))
        );
    }
}
