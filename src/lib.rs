pub mod error_handling;
pub mod grammar;
pub mod automaton;
pub mod generator;
pub mod parser;
