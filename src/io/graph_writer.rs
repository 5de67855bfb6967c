use crate::graph::CompatibilityGraph;
use anyhow::{Context, Result};
use std::io::Write;

/// A writer for compatibility graphs, using the format read by [`GraphReader`](super::GraphReader).
///
/// The node labels are written on the first line, in index order, then each edge is written on its own line.
#[derive(Default)]
pub struct GraphWriter;

impl GraphWriter {
    /// Writes a graph.
    pub fn write(&self, graph: &CompatibilityGraph, writer: &mut dyn Write) -> Result<()> {
        let context = "while writing a graph";
        let labels = graph
            .labels()
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<String>>();
        writeln!(writer, "{}", labels.join(" ")).context(context)?;
        graph.iter_edges().try_for_each(|(i, j)| {
            writeln!(writer, "{} {}", graph.label(i), graph.label(j)).context(context)
        })?;
        writer.flush().context(context)
    }
}
