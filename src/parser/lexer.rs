use itertools::{Itertools, PeekingNext};

use super::{CompileErrorType, Result};

#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    Equals,
    Or,
    Epsilon,
    Nonterminal(String),
    Terminal(String)
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '=' || c == '|' || c == '"' || c == ';'
}

pub fn lex_terminal(line: &mut impl Iterator<Item = char>) -> Result<Token> {
    line.next(); // Consume open quote
    let mut token_text = String::new();

    loop {
        match line.next() {
            Some('"') => return Ok(Token::Terminal(token_text)),
            // A backslash takes the next character literally, quotes included
            Some('\\') => match line.next() {
                Some(c) => token_text.push(c),
                None => return Err(CompileErrorType::UnmatchedQuote),
            },
            Some(c) => token_text.push(c),
            None => return Err(CompileErrorType::UnmatchedQuote),
        }
    }
}

pub fn lex_nonterminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    let name: String = line.peeking_take_while(|&c| !is_delimiter(c)).collect();
    if name == "ε" {
        Ok(Token::Epsilon)
    } else {
        Ok(Token::Nonterminal(name))
    }
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(c) = line_chars.peek() {
        if *c == ';' {
            // The rest of the line is a comment
            break;
        } else if *c == '=' {
            line_chars.next();
            tokens.push(Token::Equals);
        } else if *c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if *c == '\"' {
            tokens.push(lex_terminal(&mut line_chars)?);
        } else if !c.is_whitespace() {
            tokens.push(lex_nonterminal(&mut line_chars)?);
        } else {
            line_chars.next();
        }
    }

    Ok(tokens)
}
