use std::collections::BTreeSet;

use super::CompileErrorType::UndefinedNonterminal;
use super::{Alternative, CompileError, CompileErrors, FileResult, Marked, Rule};

// Every nonterminal that appears on some left-hand side
fn defined_nonterminals(rules: &[Rule]) -> BTreeSet<&String> {
    rules.iter()
        .flat_map(|rule| rule.head.iter())
        .filter_map(|symbol| match symbol {
            Marked::Nonterminal(name) => Some(name),
            Marked::Terminal(_) => None
        })
        .collect()
}

fn get_alternative_undefined_symbols(alternative: &Alternative, rule: &Rule, defined: &BTreeSet<&String>) -> CompileErrors {
    alternative.iter()
        .filter_map(|symbol| match symbol {
            Marked::Nonterminal(name) => Some(name),
            Marked::Terminal(_) => None
        })
        .filter(|name| !defined.contains(name))
        .map(|name| CompileError {
            location: rule.location.clone(),
            error: UndefinedNonterminal(name.to_owned())
        })
        .collect()
}

fn get_undefined_symbols(rules: &[Rule]) -> CompileErrors {
    let defined = defined_nonterminals(rules);

    rules.iter()
        .flat_map(|rule| rule.rewrite.iter().map(move |alternative| (rule, alternative)))
        .flat_map(|(rule, alternative)| get_alternative_undefined_symbols(alternative, rule, &defined))
        .collect()
}

pub(super) fn verify_rules(rules: &[Rule]) -> FileResult<()> {
    let errors = get_undefined_symbols(rules);

    if errors.len() > 0 {
        Err(errors)
    } else {
        Ok(())
    }
}
