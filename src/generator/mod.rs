/*
    This module generates random words from regular grammars
*/

use rand::prelude::*;
use std::fmt::Display;

use crate::grammar::*;
use crate::error_handling::*;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // Random walks only make sense on right-regular grammars
    NotRegular(GrammarType),
    // A nonterminal was reached that has no rules
    UndefinedNonterminal(String),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::NotRegular(found) => write!(f, "Can only generate words from a regular grammar, found {}", found),
            GenerateErrorType::UndefinedNonterminal(nonterminal) => write!(f, "No definition for nonterminal {}", nonterminal),
        }
    }
}

pub type GenResult<T> = std::result::Result<Vec<T>, GenerateErrorType>;

/// Builds a word by walking the grammar from its start symbol, picking one
/// of the current nonterminal's rules uniformly at random at every step.
///
/// The walk only ends on a rule without a following nonterminal, so a grammar
/// where no such rule is reachable never returns.
pub fn sample<T: Symbol, R: Rng + ?Sized>(grammar: &Grammar<T>, rng: &mut R) -> GenResult<T> {
    if let Err(GrammarErrorType::NotRegular(found)) = grammar.ensure_regular() {
        return Err(GenerateErrorType::NotRegular(found));
    }

    let mut word = Vec::new();
    let mut nonterminal = grammar.start();
    loop {
        let tails: Vec<&Phrase<T>> = grammar
            .alternatives(nonterminal)
            .map(|tails| tails.iter().collect())
            .unwrap_or_default();

        let tail: &Phrase<T> = *tails
            .choose(rng)
            .ok_or_else(|| GenerateErrorType::UndefinedNonterminal(describe(nonterminal)))?;

        match tail.as_slice() {
            [terminal, next] => {
                word.push(terminal.clone());
                nonterminal = next;
            }
            [terminal] => {
                word.push(terminal.clone());
                return Ok(word);
            }
            _ => return Ok(word),
        }
    }
}

// Samples with the thread-local generator
pub fn generate<T: Symbol>(grammar: &Grammar<T>) -> GenResult<T> {
    sample(grammar, &mut thread_rng())
}
