use std::fmt::Display;

use super::{Grammar, GrammarErrorType, Result, Symbol};

/// Position of a grammar in the Chomsky hierarchy.
///
/// Variants are ordered from least to most restrictive, so the type of a
/// whole grammar is the minimum over its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarType {
    Unrestricted,
    ContextSensitive,
    ContextFree,
    Regular,
}

impl Display for GrammarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarType::Unrestricted => write!(f, "unrestricted (type 0)"),
            GrammarType::ContextSensitive => write!(f, "context-sensitive (type 1)"),
            GrammarType::ContextFree => write!(f, "context-free (type 2)"),
            GrammarType::Regular => write!(f, "regular (type 3)"),
        }
    }
}

impl<T: Symbol> Grammar<T> {
    pub fn classify(&self) -> GrammarType {
        // Construction guarantees at least one rule
        self.rules()
            .map(|(head, tail)| self.rule_type(head, tail))
            .min()
            .unwrap_or(GrammarType::Regular)
    }

    pub fn rule_type(&self, head: &[T], tail: &[T]) -> GrammarType {
        if self.is_regular_rule(head, tail) {
            GrammarType::Regular
        } else if head.len() == 1 && self.is_nonterminal(&head[0]) {
            GrammarType::ContextFree
        } else if self.is_context_sensitive_rule(head, tail) {
            GrammarType::ContextSensitive
        } else {
            GrammarType::Unrestricted
        }
    }

    // A -> ε, A -> a, A -> aB
    fn is_regular_rule(&self, head: &[T], tail: &[T]) -> bool {
        if head.len() != 1 || !self.is_nonterminal(&head[0]) {
            return false;
        }
        match tail {
            [] => true,
            [a] => self.is_terminal(a),
            [a, b] => self.is_terminal(a) && self.is_nonterminal(b),
            _ => false,
        }
    }

    // Some nonterminal of the head is rewritten while the symbols around it
    // stay in place, and the rule never shrinks
    fn is_context_sensitive_rule(&self, head: &[T], tail: &[T]) -> bool {
        if head.len() > tail.len() {
            return false;
        }
        head.iter().enumerate()
            .filter(|(_, symbol)| self.is_nonterminal(symbol))
            .any(|(i, _)| {
                let (left, right) = (&head[..i], &head[i + 1..]);
                tail.starts_with(left) && tail.ends_with(right)
            })
    }

    pub fn ensure_regular(&self) -> Result<()> {
        match self.classify() {
            GrammarType::Regular => Ok(()),
            found => Err(GrammarErrorType::NotRegular(found)),
        }
    }

    pub fn ensure_context_free(&self) -> Result<()> {
        match self.classify() {
            found if found >= GrammarType::ContextFree => Ok(()),
            found => Err(GrammarErrorType::NotContextFree(found)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tests::*;
    use crate::grammar::Productions;

    fn single_rule(nonterminals: &[&str], terminals: &[&str], head: &str, tail: &str) -> Grammar<String> {
        let mut rules: Productions<String> = Productions::new();
        rules.insert(phrase(head), [phrase(tail)].into_iter().collect());
        Grammar::new(symbols(nonterminals), symbols(terminals), rules, nonterminals[0].to_string()).unwrap()
    }

    fn char_rule(head: &str, tail: &str) -> Grammar<char> {
        let mut rules: Productions<char> = Productions::new();
        rules.insert(head.chars().collect(), [tail.chars().collect::<Vec<_>>()].into_iter().collect());
        Grammar::new("ABC".chars().collect(), "abx".chars().collect(), rules, 'A').unwrap()
    }

    #[test]
    fn classify_regular() {
        assert_eq!(regular_grammar().classify(), GrammarType::Regular);
        assert!(regular_grammar().ensure_regular().is_ok());
        assert!(regular_grammar().ensure_context_free().is_ok());
    }

    #[test]
    fn classify_context_free() {
        let grammar = single_rule(&["A", "B"], &["a"], "A", "A a A");
        assert_eq!(grammar.classify(), GrammarType::ContextFree);
        assert_eq!(grammar.ensure_regular(), Err(GrammarErrorType::NotRegular(GrammarType::ContextFree)));

        // Nonterminal first is not right-regular
        let grammar = single_rule(&["A", "B"], &["a"], "A", "B a");
        assert_eq!(grammar.classify(), GrammarType::ContextFree);
    }

    #[test]
    fn classify_context_sensitive() {
        for (head, tail) in [("abAbC", "abAbC"), ("abAbC", "abxxxbC"), ("AbC", "xxxbC"), ("bCA", "bCB")] {
            assert_eq!(char_rule(head, tail).classify(), GrammarType::ContextSensitive, "{} -> {}", head, tail);
        }
    }

    #[test]
    fn classify_unrestricted() {
        for (head, tail) in [("abbC", "abAbC"), ("abAbC", "abbC")] {
            let grammar = char_rule(head, tail);
            assert_eq!(grammar.classify(), GrammarType::Unrestricted, "{} -> {}", head, tail);
            assert_eq!(grammar.ensure_context_free(), Err(GrammarErrorType::NotContextFree(GrammarType::Unrestricted)));
        }
    }

    #[test]
    fn terminal_head_is_unrestricted() {
        let grammar = single_rule(&["A"], &["a"], "a", "a A");
        assert_eq!(grammar.classify(), GrammarType::Unrestricted);
    }

    #[test]
    fn classify_is_minimum_over_rules() {
        let rules = productions(&[("A", "a A | b"), ("B", "A b A"), ("a B", "a b B")]);
        let grammar = Grammar::new(symbols(&["A", "B"]), symbols(&["a", "b"]), rules, "A".to_string()).unwrap();

        let least = grammar.rules()
            .map(|(head, tail)| grammar.rule_type(head, tail))
            .min()
            .unwrap();
        assert_eq!(least, GrammarType::ContextSensitive);
        assert_eq!(grammar.classify(), least);
    }
}
