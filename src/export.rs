//! Graphviz DOT export — serialize a state graph for visual inspection.
//!
//! Produces a `digraph` with one node per reachable state (labeled with its
//! level vector) and one edge per transition. Initial states are drawn with
//! a double border. When a degree map is supplied, each node label carries
//! the state's degree, which makes satisfaction gradients visible at a
//! glance:
//!
//! ```text
//! StateGraph → write_dot() → dot -Tsvg → state-space picture
//! ```

use std::io::Write;

use crate::eval::DegreeMap;
use crate::graph::StateGraph;
use crate::Result;

/// Write the state graph as a Graphviz DOT document.
pub fn write_dot(
    graph: &StateGraph,
    degrees: Option<&DegreeMap>,
    writer: &mut dyn Write,
) -> Result<()> {
    writeln!(writer, "digraph states {{")?;
    writeln!(writer, "    node [shape=ellipse];")?;

    for id in graph.state_ids() {
        let state = graph.state(id);
        let label = match degrees {
            Some(map) => format!("{state}\\n{}", map.get(id)),
            None => state.to_string(),
        };
        let shape = if graph.initial_states().contains(&id) {
            ", peripheries=2"
        } else {
            ""
        };
        writeln!(writer, "    s{id} [label=\"{label}\"{shape}];")?;
    }

    for source in graph.state_ids() {
        for &target in graph.successors(source) {
            writeln!(writer, "    s{source} -> s{target};")?;
        }
    }

    writeln!(writer, "}}")?;
    Ok(())
}
