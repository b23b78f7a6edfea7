/*
    This module parses grammar files
*/

mod lexer;
mod verifier;

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::PathBuf;

use crate::grammar::{Grammar, GrammarErrorType, Phrase, Productions};
use crate::error_handling::*;
use itertools::Itertools;
use lexer::*;
use verifier::verify_rules;

#[derive(Debug)]
pub enum CompileErrorType {
    // A line which should contain a rule does not
    MissingEquals,
    // A rule has multiple equals signs
    UnexpectedEquals,
    // A rule has nothing before its equals sign
    MissingHead,
    // The left-hand side of a rule has alternatives
    UnexpectedOr,
    // The left-hand side of a rule only has terminals
    HeadWithoutNonterminal,
    // There is an unclosed quote
    UnmatchedQuote,
    // A nonterminal is used but never rewritten
    UndefinedNonterminal(String),
    // Somehow a full rewrite was parsed as a base alternative
    // This is a problem with the parser, not the grammar
    UnsplitRewrite,
    // A blank line got too deep into the parser
    // This is a problem with the parser, not the grammar
    UnexpectedBlankLine,
    // The rules do not add up to a valid grammar
    InvalidGrammar(GrammarErrorType),
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CompileErrorType::FileError(a), CompileErrorType::FileError(b)) => a.kind() == b.kind(),
            (CompileErrorType::UndefinedNonterminal(a), CompileErrorType::UndefinedNonterminal(b)) => a == b,
            (CompileErrorType::InvalidGrammar(a), CompileErrorType::InvalidGrammar(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingEquals => write!(f, "Expected `=` after the left-hand side"),
            CompileErrorType::UnexpectedEquals => write!(f, "Unexpected `=` encountered"),
            CompileErrorType::MissingHead => write!(f, "Expected symbols before `=`"),
            CompileErrorType::UnexpectedOr => write!(f, "Unexpected `|` before `=`"),
            CompileErrorType::HeadWithoutNonterminal => write!(f, "The left-hand side needs at least one nonterminal"),
            CompileErrorType::UnmatchedQuote => write!(f, "Unmatched quotes"),
            CompileErrorType::UndefinedNonterminal(nonterminal) => write!(f, "Could not find definition for `{}`", nonterminal),
            CompileErrorType::UnsplitRewrite => write!(f, "Rewrite was not fully split (this is a problem with the parser, not the grammar)"),
            CompileErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule parser (this is a problem with the parser, not the grammar)"),
            CompileErrorType::InvalidGrammar(error) => write!(f, "{}", error),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: PathBuf) -> CompileError {
    CompileError {
        location: Location::file(file),
        error: CompileErrorType::FileError(error)
    }
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

// A symbol as written in the file, before terminals and nonterminals are
// collected into their own sets
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone)]
pub enum Marked {
    Terminal(String),
    Nonterminal(String),
}

impl Marked {
    fn name(&self) -> &String {
        match self {
            Marked::Terminal(s) | Marked::Nonterminal(s) => s
        }
    }
}

// The symbols in a single alternative
pub type Alternative = Vec<Marked>;

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

#[derive(PartialEq, Debug)]
struct Rule {
    head: Alternative,
    rewrite: Rewrite,
    location: Location
}

fn parse_alternative(tokens: &[Token]) -> Result<Alternative> {
    tokens.iter().filter_map(|t| match t {
        Token::Equals => Some(Err(CompileErrorType::UnexpectedEquals)),
        Token::Or => Some(Err(CompileErrorType::UnsplitRewrite)),
        // Both spell out the empty word
        Token::Epsilon => None,
        Token::Terminal(s) if s.is_empty() => None,
        Token::Nonterminal(s) => Some(Ok(Marked::Nonterminal(s.clone()))),
        Token::Terminal(s) => Some(Ok(Marked::Terminal(s.clone())))
    }).collect()
}

fn parse_rewrite(tokens: &[Token]) -> Result<Rewrite> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_head(tokens: &[Token]) -> Result<Alternative> {
    if tokens.contains(&Token::Or) {
        return Err(CompileErrorType::UnexpectedOr);
    }

    let head = parse_alternative(tokens)?;
    if head.is_empty() {
        Err(CompileErrorType::MissingHead)
    } else if !head.iter().any(|s| matches!(s, Marked::Nonterminal(_))) {
        Err(CompileErrorType::HeadWithoutNonterminal)
    } else {
        Ok(head)
    }
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    if tokens.is_empty() {
        return Err(CompileErrorType::UnexpectedBlankLine);
    }

    let equals = tokens.iter()
        .position(|t| *t == Token::Equals)
        .ok_or(CompileErrorType::MissingEquals)?;

    let head = parse_head(&tokens[..equals])?;
    let rewrite = parse_rewrite(&tokens[equals + 1..])?;

    Ok(Rule {
        head,
        rewrite,
        location
    })
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| CompileError { location, error })
}

fn is_rule_line(line: &String) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(';')
}

// Returns an iterator over the lines of a file, with the io errors wrapped
// in CompileError and enumerated
fn file_line_nums<'a>(file: File, path: &'a PathBuf) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    std::io::BufReader::new(file)
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path.clone())))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

fn unmark(symbols: &[Marked]) -> Phrase<String> {
    symbols.iter().map(|s| s.name().clone()).collect()
}

fn grammar_from_rules(rules: Vec<Rule>, path: &PathBuf) -> FileResult<Grammar<String>> {
    verify_rules(&rules)?;

    // The first nonterminal written down is where derivations begin
    let start = rules.iter()
        .flat_map(|rule| rule.head.iter())
        .find_map(|s| match s {
            Marked::Nonterminal(name) => Some(name.clone()),
            Marked::Terminal(_) => None,
        })
        .ok_or_else(|| vec![CompileError {
            location: Location::file(path.clone()),
            error: CompileErrorType::InvalidGrammar(GrammarErrorType::NoRules)
        }])?;

    let mut nonterminals = BTreeSet::new();
    let mut terminals = BTreeSet::new();
    let mut productions = Productions::new();

    for rule in &rules {
        for symbol in rule.head.iter().chain(rule.rewrite.iter().flatten()) {
            match symbol {
                Marked::Nonterminal(name) => nonterminals.insert(name.clone()),
                Marked::Terminal(name) => terminals.insert(name.clone()),
            };
        }

        productions
            .entry(unmark(&rule.head))
            .or_insert_with(BTreeSet::new)
            .extend(rule.rewrite.iter().map(|alternative| unmark(alternative)));
    }

    Grammar::new(nonterminals, terminals, productions, start)
        .map_err(|error| vec![CompileError {
            location: Location::file(path.clone()),
            error: CompileErrorType::InvalidGrammar(error)
        }])
}

fn parse_lines(lines: impl Iterator<Item = (usize, LineResult<String>)>, path: &PathBuf) -> FileResult<Grammar<String>> {
    let parsed_lines = lines.map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_line(&line, Location {
            file: path.clone(),
            line: num
        }))
    });

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if errors.len() > 0 {
        return Err(errors);
    }

    grammar_from_rules(rules, path)
}

pub fn parse_file(path: &PathBuf) -> FileResult<Grammar<String>> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path.clone())])?;
    parse_lines(file_line_nums(file, path), path)
}

// Parses grammar text that did not come from disk; `path` only labels errors
pub fn parse_source(source: &str, path: &PathBuf) -> FileResult<Grammar<String>> {
    let lines = source.lines()
        .map(str::to_string)
        .enumerate()
        .filter(|(_, line)| is_rule_line(line))
        .map(|(num, line)| (num + 1, Ok(line)))
        .collect_vec();

    parse_lines(lines.into_iter(), path)
}
