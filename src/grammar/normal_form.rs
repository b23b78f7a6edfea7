/*
    Chomsky Normal Form rewriting

    The stages run in a fixed order and each one relies on what the previous
    ones established:
        START  the start symbol never occurs on a right-hand side
        TERM   terminals only occur alone on a right-hand side
        BIN    right-hand sides have at most two symbols
        DEL    only the start symbol has an epsilon rule; this is only sound
               after START, since the start symbol must not be nullable from
               inside another rule
        UNIT   no rule rewrites one nonterminal into another
*/

use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use itertools::Itertools;
use log::debug;

use super::{describe, Alternatives, Fresh, Grammar, GrammarErrorType, Phrase, Result, Symbol};

// A grammar in the middle of being rewritten. Every head is a single
// nonterminal, so rules are keyed by it directly.
#[derive(Debug, Clone, PartialEq)]
struct Draft<T: Symbol> {
    nonterminals: BTreeSet<T>,
    terminals: BTreeSet<T>,
    rules: BTreeMap<T, Alternatives<T>>,
    start: T,
}

impl<T: Fresh> Grammar<T> {
    /// Rewrites a context-free grammar into Chomsky Normal Form.
    ///
    /// The result derives the same non-empty words. It derives the empty word
    /// exactly when the original start symbol is nullable.
    pub fn to_normal_form(&self) -> Result<Grammar<T>> {
        self.ensure_context_free()?;

        let draft = Draft::from_grammar(self)
            .isolate_start()
            .isolate_terminals()
            .binarize()
            .remove_epsilon()?
            .remove_units();

        draft.into_grammar()
    }
}

impl<T: Symbol> Grammar<T> {
    pub fn is_in_normal_form(&self) -> bool {
        self.rules().all(|(head, tail)| match (head.as_slice(), tail.as_slice()) {
            ([lhs], []) => lhs == self.start(),
            ([lhs], [a]) => self.is_nonterminal(lhs) && self.is_terminal(a),
            ([lhs], [b, c]) => self.is_nonterminal(lhs) && self.is_nonterminal(b) && self.is_nonterminal(c),
            _ => false,
        })
    }
}

impl<T: Fresh> Draft<T> {
    fn from_grammar(grammar: &Grammar<T>) -> Self {
        let rules = grammar.productions()
            .iter()
            .filter_map(|(head, tails)| match head.as_slice() {
                [nonterminal] => Some((nonterminal.clone(), tails.clone())),
                _ => None,
            })
            .collect();

        Draft {
            nonterminals: grammar.nonterminals().clone(),
            terminals: grammar.terminals().clone(),
            rules,
            start: grammar.start().clone(),
        }
    }

    fn into_grammar(self) -> Result<Grammar<T>> {
        let productions = self.rules
            .into_iter()
            .filter(|(_, tails)| !tails.is_empty())
            .map(|(head, tails)| (vec![head], tails))
            .collect();

        Grammar::new(self.nonterminals, self.terminals, productions, self.start)
    }

    fn rule_count(&self) -> usize {
        self.rules.values().map(BTreeSet::len).sum()
    }

    // Claims the first unused `base` + number as a new nonterminal
    fn fresh(&mut self, base: &T) -> T {
        let mut suffix = 0;
        loop {
            let candidate = base.suffixed(suffix);
            if !self.nonterminals.contains(&candidate) && !self.terminals.contains(&candidate) {
                self.nonterminals.insert(candidate.clone());
                return candidate;
            }
            suffix += 1;
        }
    }

    fn is_unit(&self, tail: &[T]) -> bool {
        matches!(tail, [symbol] if self.nonterminals.contains(symbol))
    }

    fn isolate_start(mut self) -> Self {
        let old_start = self.start.clone();
        let start = self.fresh(&old_start);

        self.rules.insert(start.clone(), BTreeSet::from([vec![old_start]]));
        self.start = start;

        debug!("START: {} rules, start symbol is now {:?}", self.rule_count(), self.start);
        self
    }

    fn isolate_terminals(mut self) -> Self {
        let rules = mem::take(&mut self.rules);

        let embedded: BTreeSet<T> = rules.values()
            .flatten()
            .filter(|tail| tail.len() > 1)
            .flatten()
            .filter(|symbol| self.terminals.contains(*symbol))
            .cloned()
            .collect();

        let mut proxies = BTreeMap::new();
        for terminal in embedded {
            let proxy = self.fresh(&terminal);
            proxies.insert(terminal, proxy);
        }

        let substitute = |tail: &Phrase<T>| -> Phrase<T> {
            if tail.len() > 1 {
                tail.iter().map(|symbol| proxies.get(symbol).unwrap_or(symbol).clone()).collect()
            } else {
                tail.clone()
            }
        };

        let mut isolated: BTreeMap<T, Alternatives<T>> = rules.iter()
            .map(|(head, tails)| (head.clone(), tails.iter().map(&substitute).collect()))
            .collect();
        for (terminal, proxy) in &proxies {
            isolated.insert(proxy.clone(), BTreeSet::from([vec![terminal.clone()]]));
        }

        self.rules = isolated;
        debug!("TERM: {} rules, {} terminal proxies", self.rule_count(), proxies.len());
        self
    }

    fn binarize(mut self) -> Self {
        let rules = mem::take(&mut self.rules);
        let mut binary: BTreeMap<T, Alternatives<T>> = BTreeMap::new();

        for (head, tails) in rules {
            binary.entry(head.clone()).or_default();

            for tail in tails {
                if tail.len() <= 2 {
                    binary.entry(head.clone()).or_default().insert(tail);
                    continue;
                }

                // A -> s1 s2 ... sk  becomes  A -> s1 N1, N1 -> s2 N2, ..., Nk-2 -> sk-1 sk
                let (chained, last) = tail.split_at(tail.len() - 2);
                let mut current = head.clone();
                for symbol in chained {
                    let next = self.fresh(&head);
                    binary.entry(current).or_default().insert(vec![symbol.clone(), next.clone()]);
                    current = next;
                }
                binary.entry(current).or_default().insert(last.to_vec());
            }
        }

        self.rules = binary;
        debug!("BIN: {} rules", self.rule_count());
        self
    }

    // Nonterminals that can derive the empty word
    fn nullable(&self) -> BTreeSet<T> {
        let mut nullable = BTreeSet::new();
        loop {
            let grown: BTreeSet<T> = self.rules.iter()
                .filter(|(_, tails)| tails.iter().any(|tail| tail.iter().all(|symbol| nullable.contains(symbol))))
                .map(|(head, _)| head.clone())
                .collect();
            if grown.len() == nullable.len() {
                return nullable;
            }
            nullable = grown;
        }
    }

    // Nullable nonterminals that can derive nothing but the empty word
    fn null(&self, nullable: &BTreeSet<T>) -> BTreeSet<T> {
        let mut null = nullable.clone();
        loop {
            let shrunk: BTreeSet<T> = null.iter()
                .filter(|head| {
                    self.rules.get(*head).map_or(false, |tails| {
                        tails.iter().flatten().all(|symbol| null.contains(symbol))
                    })
                })
                .cloned()
                .collect();
            if shrunk.len() == null.len() {
                return null;
            }
            null = shrunk;
        }
    }

    fn remove_epsilon(mut self) -> Result<Self> {
        let undefined = self.rules.values()
            .flatten()
            .flatten()
            .find(|symbol| self.nonterminals.contains(*symbol) && !self.rules.contains_key(*symbol));
        if let Some(symbol) = undefined {
            return Err(GrammarErrorType::UndefinedNonterminal(describe(symbol)));
        }

        let nullable = self.nullable();
        let null = self.null(&nullable);
        let rules = mem::take(&mut self.rules);
        let mut kept: BTreeMap<T, Alternatives<T>> = BTreeMap::new();

        for (head, tails) in rules {
            let alternatives = kept.entry(head).or_default();
            for tail in tails {
                // Null symbols always go, other nullable symbols may stay or go
                let choices = tail.iter()
                    .filter(|symbol| !null.contains(*symbol))
                    .map(|symbol| if nullable.contains(symbol) {
                        vec![Some(symbol.clone()), None]
                    } else {
                        vec![Some(symbol.clone())]
                    });

                for combination in choices.multi_cartesian_product() {
                    let reduced: Phrase<T> = combination.into_iter().flatten().collect();
                    if !reduced.is_empty() {
                        alternatives.insert(reduced);
                    }
                }
            }
        }

        if nullable.contains(&self.start) {
            kept.entry(self.start.clone()).or_default().insert(Vec::new());
        }

        self.rules = kept;
        debug!("DEL: {} rules, {} nullable, {} null", self.rule_count(), nullable.len(), null.len());
        Ok(self)
    }

    fn remove_units(mut self) -> Self {
        let rules = mem::take(&mut self.rules);
        let mut expanded: BTreeMap<T, Alternatives<T>> = BTreeMap::new();

        for head in rules.keys() {
            // Everything reachable from `head` through unit rules, cycles included
            let mut reachable = BTreeSet::from([head.clone()]);
            let mut pending = vec![head.clone()];
            while let Some(current) = pending.pop() {
                for tail in rules.get(&current).into_iter().flatten() {
                    if self.is_unit(tail) && reachable.insert(tail[0].clone()) {
                        pending.push(tail[0].clone());
                    }
                }
            }

            let tails = reachable.iter()
                .filter_map(|nonterminal| rules.get(nonterminal))
                .flatten()
                .filter(|tail| !self.is_unit(tail))
                .cloned()
                .collect();
            expanded.insert(head.clone(), tails);
        }

        self.rules = expanded;
        debug!("UNIT: {} rules", self.rule_count());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tests::*;
    use crate::grammar::GrammarType;

    fn grammar(nonterminals: &[&str], terminals: &[&str], rows: &[(&str, &str)], start: &str) -> Grammar<String> {
        Grammar::new(symbols(nonterminals), symbols(terminals), productions(rows), start.to_string()).unwrap()
    }

    fn draft(rows: &[(&str, &str)]) -> BTreeMap<String, Alternatives<String>> {
        productions(rows).into_iter().map(|(head, tails)| (head[0].clone(), tails)).collect()
    }

    // CYK membership test, only meaningful for grammars in normal form
    fn derives(grammar: &Grammar<String>, word: &[&str]) -> bool {
        let n = word.len();
        if n == 0 {
            return grammar.alternatives(grammar.start()).map_or(false, |tails| tails.contains(&Vec::new()));
        }

        let mut table = vec![vec![BTreeSet::new(); n + 1]; n];
        for (i, symbol) in word.iter().enumerate() {
            for (head, tail) in grammar.rules() {
                if tail.len() == 1 && tail[0] == *symbol {
                    table[i][1].insert(head[0].clone());
                }
            }
        }
        for len in 2..=n {
            for i in 0..=n - len {
                for split in 1..len {
                    for (head, tail) in grammar.rules() {
                        if tail.len() == 2
                            && table[i][split].contains(&tail[0])
                            && table[i + split][len - split].contains(&tail[1])
                        {
                            table[i][len].insert(head[0].clone());
                        }
                    }
                }
            }
        }
        table[0][n].contains(grammar.start())
    }

    fn words(alphabet: &[&'static str], max_len: usize) -> Vec<Vec<&'static str>> {
        let mut all = vec![vec![]];
        let mut frontier = vec![vec![]];
        for _ in 0..max_len {
            frontier = frontier.iter()
                .flat_map(|word: &Vec<&'static str>| alphabet.iter().map(move |symbol| {
                    let mut longer = word.clone();
                    longer.push(*symbol);
                    longer
                }))
                .collect();
            all.extend(frontier.iter().cloned());
        }
        all
    }

    fn balanced(word: &[&str]) -> bool {
        let mut depth = 0i32;
        for symbol in word {
            depth += if *symbol == "(" { 1 } else { -1 };
            if depth < 0 {
                return false;
            }
        }
        depth == 0
    }

    #[test]
    fn fresh_names_skip_taken_symbols() {
        let mut draft = Draft::from_grammar(&grammar(&["S", "S0"], &["S1"], &[("S", "S1 S0"), ("S0", "S1")], "S"));
        assert_eq!(draft.fresh(&"S".to_string()), "S2");
        assert_eq!(draft.fresh(&"S".to_string()), "S3");
        assert_eq!(draft.fresh(&"a".to_string()), "a0");
    }

    #[test]
    fn start_stage() {
        let g = grammar(&["S"], &["a"], &[("S", "a S | a")], "S");
        let started = Draft::from_grammar(&g).isolate_start();

        assert_eq!(started.start, "S0");
        assert_eq!(started.rules, draft(&[("S0", "S"), ("S", "a S | a")]));
    }

    #[test]
    fn term_stage() {
        let g = grammar(&["A", "B"], &["a"], &[("A", "A a A | a A B")], "A");
        let isolated = Draft::from_grammar(&g).isolate_start().isolate_terminals();

        assert!(isolated.nonterminals.contains("a0"));
        assert_eq!(isolated.rules, draft(&[
            ("A0", "A"),
            ("A", "A a0 A | a0 A B"),
            ("a0", "a"),
        ]));
    }

    #[test]
    fn term_stage_leaves_lone_terminals() {
        let g = grammar(&["A"], &["a", "b"], &[("A", "a | b A")], "A");
        let isolated = Draft::from_grammar(&g).isolate_terminals();

        assert_eq!(isolated.rules, draft(&[("A", "a | b0 A"), ("b0", "b")]));
    }

    #[test]
    fn bin_stage() {
        let g = grammar(&["A", "B", "C", "D"], &["d"], &[("A", "B C D B | B C"), ("B", "d"), ("C", "d"), ("D", "d")], "A");
        let binary = Draft::from_grammar(&g).binarize();

        assert_eq!(binary.rules, draft(&[
            ("A", "B A0 | B C"),
            ("A0", "C A1"),
            ("A1", "D B"),
            ("B", "d"),
            ("C", "d"),
            ("D", "d"),
        ]));
    }

    #[test]
    fn nullable_and_null_sets() {
        let g = grammar(
            &["S", "A", "B", "C", "D"],
            &["a"],
            &[("S", "A B | a"), ("A", " | A"), ("B", "a | C"), ("C", "D | "), ("D", "C")],
            "S"
        );
        let d = Draft::from_grammar(&g);
        let nullable = d.nullable();
        assert_eq!(nullable, symbols(&["A", "B", "C", "D", "S"]));
        assert_eq!(d.null(&nullable), symbols(&["A", "C", "D"]));
    }

    #[test]
    fn del_stage() {
        let g = grammar(&["S", "A", "B"], &["a", "b"], &[("S", "A S B | a"), ("A", "a | "), ("B", "b")], "S");
        let removed = Draft::from_grammar(&g).isolate_start().remove_epsilon().unwrap();

        assert_eq!(removed.rules, draft(&[
            ("S0", "S"),
            ("S", "A S B | S B | a"),
            ("A", "a"),
            ("B", "b"),
        ]));
    }

    #[test]
    fn del_stage_keeps_start_epsilon() {
        let g = grammar(&["S"], &["a"], &[("S", "a S | ")], "S");
        let removed = Draft::from_grammar(&g).isolate_start().remove_epsilon().unwrap();

        assert_eq!(removed.rules, draft(&[("S0", "S | "), ("S", "a S | a")]));
    }

    #[test]
    fn del_stage_rejects_undefined_nonterminal() {
        let g = grammar(&["A", "B"], &["a"], &[("A", "A a A | a A B")], "A");
        assert_eq!(g.to_normal_form(), Err(GrammarErrorType::UndefinedNonterminal("\"B\"".to_string())));
    }

    #[test]
    fn unit_stage_handles_cycles() {
        let g = grammar(&["S", "A", "B"], &["a", "b"], &[("S", "A"), ("A", "B | a"), ("B", "A | b")], "S");
        let expanded = Draft::from_grammar(&g).remove_units();

        assert_eq!(expanded.rules, draft(&[("S", "a | b"), ("A", "a | b"), ("B", "a | b")]));
    }

    #[test]
    fn unit_cycle_leaves_no_rules() {
        // S and A only rewrite into each other, so the language is empty
        let g = grammar(&["S", "A"], &["a"], &[("S", "A"), ("A", "S")], "S");
        assert_eq!(g.classify(), GrammarType::ContextFree);
        assert_eq!(g.to_normal_form(), Err(GrammarErrorType::NoRules));
    }

    #[test]
    fn normal_form_of_regular_grammar() {
        let normal = regular_grammar().to_normal_form().unwrap();

        assert!(normal.is_in_normal_form());
        assert_eq!(normal.start(), "A0");
        assert_eq!(normal.classify(), GrammarType::ContextFree);
        for word in words(&["a", "b"], 6) {
            // (a)*ab? style language: a^n, or a^n b with n >= 1
            let a_count = word.iter().take_while(|s| **s == "a").count();
            let expected = a_count == word.len() || (a_count >= 1 && a_count + 1 == word.len() && word[a_count] == "b");
            assert_eq!(derives(&normal, &word), expected, "{:?}", word);
        }
    }

    #[test]
    fn normal_form_of_balanced_parentheses() {
        let g = grammar(&["S"], &["(", ")"], &[("S", "( S ) S | ")], "S");
        let normal = g.to_normal_form().unwrap();

        assert!(!g.is_in_normal_form());
        assert!(normal.is_in_normal_form());
        for word in words(&["(", ")"], 8) {
            assert_eq!(derives(&normal, &word), balanced(&word), "{:?}", word);
        }
    }

    #[test]
    fn normal_form_of_arithmetic() {
        let g = grammar(
            &["E", "T", "F"],
            &["+", "*", "x", "(", ")"],
            &[("E", "E + T | T"), ("T", "T * F | F"), ("F", "( E ) | x")],
            "E"
        );
        let normal = g.to_normal_form().unwrap();

        assert!(normal.is_in_normal_form());
        assert!(derives(&normal, &["x"]));
        assert!(derives(&normal, &["x", "+", "x", "*", "x"]));
        assert!(derives(&normal, &["(", "x", "+", "x", ")", "*", "x"]));
        assert!(!derives(&normal, &["x", "+"]));
        assert!(!derives(&normal, &[]));
    }

    #[test]
    fn normal_form_requires_context_free() {
        let g = grammar(&["A"], &["a"], &[("A", "a"), ("a A", "a a")], "A");
        assert_eq!(g.to_normal_form(), Err(GrammarErrorType::NotContextFree(GrammarType::ContextSensitive)));
    }

    #[test]
    fn normal_form_membership() {
        let g = grammar(&["S", "A"], &["a"], &[("S", "A A | a | "), ("A", "a")], "S");
        assert!(g.is_in_normal_form());

        let g = grammar(&["S", "A"], &["a"], &[("S", "A A | a"), ("A", "a | ")], "S");
        assert!(!g.is_in_normal_form());

        let g = grammar(&["S", "A"], &["a"], &[("S", "A a | a"), ("A", "a")], "S");
        assert!(!g.is_in_normal_form());
    }
}
