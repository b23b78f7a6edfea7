mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use chomsky::automaton::{render, Automaton, AutomatonErrorType};
use chomsky::error_handling::*;
use chomsky::generator;
use chomsky::grammar::Grammar;
use chomsky::parser;
use clap::Parser;
use cli::{Cli, Command};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn report<T: ErrorType>(file: &PathBuf, error: T) -> ExitCode {
    eprintln!("{}", Error::at(Location::file(file.clone()), error));
    ExitCode::FAILURE
}

fn print_automaton(automaton: &Automaton<String>, dot: bool) {
    if dot {
        print!("{}", render::to_dot(automaton));
    } else {
        println!("{}", automaton);
    }
}

fn print_word(word: &[String]) {
    if word.is_empty() {
        println!("ε");
    } else {
        println!("{}", word.concat());
    }
}

fn run(grammar: Grammar<String>, command: Command, file: &PathBuf) -> ExitCode {
    match command {
        Command::Classify => println!("{}", grammar.classify()),
        Command::Nfa { dot } => match grammar.to_nfa() {
            Ok(nfa) => print_automaton(&nfa, dot),
            Err(e) => return report(file, e),
        },
        Command::Dfa { dot } => match grammar.to_nfa() {
            Ok(nfa) => print_automaton(&nfa.to_dfa(), dot),
            Err(e) => return report(file, e),
        },
        Command::Verify { symbols } => {
            let verdict = grammar.to_nfa()
                .map_err(AutomatonErrorType::from)
                .and_then(|nfa| nfa.to_dfa().verify(&symbols));
            match verdict {
                Ok(true) => println!("accepted"),
                Ok(false) => println!("rejected"),
                Err(e) => return report(file, e),
            }
        },
        Command::Cnf => match grammar.to_normal_form() {
            Ok(normal) => println!("{}", normal),
            Err(e) => return report(file, e),
        },
        Command::Sample { amount, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            for _ in 0..amount {
                match generator::sample(&grammar, &mut rng) {
                    Ok(word) => print_word(&word),
                    Err(e) => return report(file, e),
                }
            }
        },
    }

    ExitCode::SUCCESS
}

fn print_errors<T: ErrorType>(errors: &Errors<T>) {
    for error in errors {
        eprintln!("{}", error);
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let grammar = match parser::parse_file(&cli.file) {
        Ok(grammar) => grammar,
        Err(errors) => {
            print_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    info!("read {} rules from {}", grammar.rules().count(), cli.file.display());

    let grammar = match cli.start {
        Some(start) => match grammar.with_start(start) {
            Ok(grammar) => grammar,
            Err(e) => return report(&cli.file, e),
        },
        None => grammar,
    };

    run(grammar, cli.command, &cli.file)
}
