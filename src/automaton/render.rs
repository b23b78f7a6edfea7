/*
    Graphviz output for automata
*/

use std::collections::BTreeMap;
use std::fmt::{self, Display, Write};

use super::{Automaton, State};
use crate::grammar::Symbol;

fn quoted(item: impl Display) -> String {
    format!("\"{}\"", item.to_string().replace('\\', "\\\\").replace('"', "\\\""))
}

/// Writes the automaton as a left-to-right DOT digraph, with final states
/// drawn as double circles.
///
/// States get generated node ids (`s0`, `s1`, ...) and carry their name as a
/// label, so no state name can collide with the `start` marker.
pub fn write_dot<T: Symbol + Display>(out: &mut impl Write, automaton: &Automaton<T>) -> fmt::Result {
    let ids: BTreeMap<&State<T>, String> = automaton.states()
        .iter()
        .enumerate()
        .map(|(i, state)| (state, format!("s{}", i)))
        .collect();

    writeln!(out, "digraph automaton {{")?;
    writeln!(out, "    rankdir=LR;")?;
    writeln!(out, "    start [shape=point];")?;

    writeln!(out, "    node [shape=doublecircle];")?;
    for state in automaton.final_states() {
        writeln!(out, "    {} [label={}];", ids[state], quoted(state))?;
    }

    writeln!(out, "    node [shape=circle];")?;
    for state in automaton.nonfinal_states() {
        writeln!(out, "    {} [label={}];", ids[state], quoted(state))?;
    }

    writeln!(out, "    start -> {};", ids[automaton.start()])?;
    for (source, destination, label) in automaton.edges() {
        writeln!(out, "    {} -> {} [label={}];", ids[source], ids[destination], quoted(label))?;
    }
    writeln!(out, "}}")
}

pub fn to_dot<T: Symbol + Display>(automaton: &Automaton<T>) -> String {
    let mut dot = String::new();
    // Writing into a String cannot fail
    let _ = write_dot(&mut dot, automaton);
    dot
}
