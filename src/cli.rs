use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Start symbol (default: first in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    #[command(subcommand)]
    pub command: Command
}

#[derive(Subcommand)]
pub enum Command {
    /// Print where the grammar sits in the Chomsky hierarchy
    Classify,

    /// Print the finite automaton of a regular grammar
    Nfa {
        /// Print Graphviz DOT instead of text
        #[arg(long)]
        dot: bool
    },

    /// Print the determinized automaton of a regular grammar
    Dfa {
        /// Print Graphviz DOT instead of text
        #[arg(long)]
        dot: bool
    },

    /// Check whether a word is in the language of a regular grammar
    Verify {
        /// Terminals making up the word (none for the empty word)
        #[arg(value_name = "SYMBOL")]
        symbols: Vec<String>
    },

    /// Print the Chomsky normal form of a context-free grammar
    Cnf,

    /// Generate random words from a regular grammar
    Sample {
        /// Amount to generate
        #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
        amount: u32,

        /// Seed for reproducible output
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>
    }
}
