/*
    This module is for storing and classifying grammars
*/

mod classify;
pub mod normal_form;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display};

use itertools::Itertools;

use crate::error_handling::ErrorType;
pub use classify::GrammarType;

// Anything usable as a terminal, nonterminal or alphabet symbol
pub trait Symbol: Clone + Ord + Debug {}

impl<T: Clone + Ord + Debug> Symbol for T {}

/// Symbols that can spawn new, numbered symbols from themselves.
///
/// Normalization needs this to introduce nonterminals that were not part of
/// the original grammar.
pub trait Fresh: Symbol {
    fn suffixed(&self, suffix: usize) -> Self;
}

impl Fresh for String {
    fn suffixed(&self, suffix: usize) -> Self {
        format!("{}{}", self, suffix)
    }
}

// An ordered run of symbols, used for both sides of a rule
pub type Phrase<T> = Vec<T>;

// Every tail a head can be rewritten to
pub type Alternatives<T> = BTreeSet<Phrase<T>>;

pub type Productions<T> = BTreeMap<Phrase<T>, Alternatives<T>>;

#[derive(Debug, PartialEq, Clone)]
pub enum GrammarErrorType {
    // A symbol was declared as both a terminal and a nonterminal
    OverlappingSymbols(String),
    // The start symbol is not one of the nonterminals
    UnknownStart(String),
    // A rule uses a symbol that was never declared
    UnknownSymbol(String),
    // A rule has nothing to rewrite
    EmptyHead,
    // There are no rules at all
    NoRules,
    // The operation only works on regular grammars
    NotRegular(GrammarType),
    // The operation only works on context-free (or stricter) grammars
    NotContextFree(GrammarType),
    // A nonterminal is used without having any rules of its own
    UndefinedNonterminal(String),
}

impl ErrorType for GrammarErrorType {}

impl Display for GrammarErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarErrorType::OverlappingSymbols(symbol) => write!(f, "Symbol {} is both a terminal and a nonterminal", symbol),
            GrammarErrorType::UnknownStart(symbol) => write!(f, "Start symbol {} is not a nonterminal", symbol),
            GrammarErrorType::UnknownSymbol(symbol) => write!(f, "Symbol {} is neither a terminal nor a nonterminal", symbol),
            GrammarErrorType::EmptyHead => write!(f, "A rule has an empty left-hand side"),
            GrammarErrorType::NoRules => write!(f, "The grammar has no rules"),
            GrammarErrorType::NotRegular(found) => write!(f, "Expected a regular grammar, found {}", found),
            GrammarErrorType::NotContextFree(found) => write!(f, "Expected a context-free grammar, found {}", found),
            GrammarErrorType::UndefinedNonterminal(symbol) => write!(f, "No rules for nonterminal {}", symbol),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrammarErrorType>;

pub(crate) fn describe<T: Debug>(symbol: &T) -> String {
    format!("{:?}", symbol)
}

/// A formal grammar: nonterminals, terminals, productions and a start symbol.
///
/// Values are checked on construction and never change afterwards; every
/// transformation builds a new grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar<T: Symbol> {
    nonterminals: BTreeSet<T>,
    terminals: BTreeSet<T>,
    productions: Productions<T>,
    start: T,
}

impl<T: Symbol> Grammar<T> {
    pub fn new(nonterminals: BTreeSet<T>, terminals: BTreeSet<T>, productions: Productions<T>, start: T) -> Result<Self> {
        if let Some(shared) = nonterminals.intersection(&terminals).next() {
            return Err(GrammarErrorType::OverlappingSymbols(describe(shared)));
        }
        if !nonterminals.contains(&start) {
            return Err(GrammarErrorType::UnknownStart(describe(&start)));
        }

        for (head, tails) in &productions {
            if head.is_empty() {
                return Err(GrammarErrorType::EmptyHead);
            }
            let undeclared = head.iter()
                .chain(tails.iter().flatten())
                .find(|symbol| !nonterminals.contains(*symbol) && !terminals.contains(*symbol));
            if let Some(symbol) = undeclared {
                return Err(GrammarErrorType::UnknownSymbol(describe(symbol)));
            }
        }

        if productions.values().all(BTreeSet::is_empty) {
            return Err(GrammarErrorType::NoRules);
        }

        Ok(Grammar {
            nonterminals,
            terminals,
            productions,
            start,
        })
    }

    // The same grammar, derived from a different nonterminal
    pub fn with_start(&self, start: T) -> Result<Self> {
        Grammar::new(self.nonterminals.clone(), self.terminals.clone(), self.productions.clone(), start)
    }

    pub fn nonterminals(&self) -> &BTreeSet<T> {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &BTreeSet<T> {
        &self.terminals
    }

    pub fn productions(&self) -> &Productions<T> {
        &self.productions
    }

    pub fn start(&self) -> &T {
        &self.start
    }

    pub fn is_nonterminal(&self, symbol: &T) -> bool {
        self.nonterminals.contains(symbol)
    }

    pub fn is_terminal(&self, symbol: &T) -> bool {
        self.terminals.contains(symbol)
    }

    /// Every `(head, tail)` pair of the production relation.
    pub fn rules(&self) -> impl Iterator<Item = (&Phrase<T>, &Phrase<T>)> + '_ {
        self.productions
            .iter()
            .flat_map(|(head, tails)| tails.iter().map(move |tail| (head, tail)))
    }

    /// The tails of the rule whose head is exactly `nonterminal`.
    pub fn alternatives(&self, nonterminal: &T) -> Option<&Alternatives<T>> {
        self.productions.get(std::slice::from_ref(nonterminal))
    }
}

fn display_phrase<T: Display>(phrase: &[T]) -> String {
    if phrase.is_empty() {
        "ε".to_string()
    } else {
        phrase.iter().join(" ")
    }
}

impl<T: Symbol + Display> Display for Grammar<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "VN = {{{}}}", self.nonterminals.iter().join(", "))?;
        writeln!(f, "VT = {{{}}}", self.terminals.iter().join(", "))?;
        writeln!(f, "S = {}", self.start)?;
        for (head, tails) in &self.productions {
            let tails = tails.iter().map(|tail| display_phrase(tail)).join(" | ");
            writeln!(f, "{} -> {}", display_phrase(head), tails)?;
        }
        Ok(())
    }
}
