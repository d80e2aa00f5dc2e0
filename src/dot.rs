//! Graphviz DOT rendering of an object graph

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::graph::{Edge, Graph};
use crate::object::{Entity, Kind};

const GRAPH_NAME: &str = "graphname";
const EDGE_FONT_SIZE: u32 = 9;

fn color(kind: Kind) -> &'static str {
    match kind {
        Kind::Commit => "red",
        Kind::Tree => "green",
        Kind::Tag => "blue",
        Kind::Blob => "grey",
    }
}

/// Escape double quotes and backslashes for a quoted DOT string.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

/// Node statement. Labelled commits show their branch names above the id.
pub fn describe_entity(entity: &Entity) -> String {
    let color = color(entity.kind());
    let labels = entity.labels();
    if labels.is_empty() {
        format!("{} [color={}]", quote(entity.id()), color)
    } else {
        // Two-line label: branch names, then the short id.
        let label = format!("\"{}\\n{}\"", escape(&labels.join("-")), escape(entity.id()));
        format!("{} [color={}; label={}]", quote(entity.id()), color, label)
    }
}

/// Edge statement. Anonymous edges carry no label.
pub fn describe_edge(graph: &Graph, edge: &Edge) -> String {
    let from = quote(graph.entity(edge.from).id());
    let to = quote(graph.entity(edge.to).id());
    if edge.is_anonymous() {
        format!("{} -> {};", from, to)
    } else {
        format!(
            "{} -> {} [label={}; fontsize={}];",
            from,
            to,
            quote(&edge.label()),
            EDGE_FONT_SIZE
        )
    }
}

/// Render the graph as a DOT document.
pub fn serialize(graph: &Graph) -> String {
    let mut out = format!("digraph {} {{\n", GRAPH_NAME);
    for entity in graph.entities() {
        out.push_str(&describe_entity(entity));
        out.push('\n');
    }
    for edge in graph.edges() {
        out.push_str(&describe_edge(graph, edge));
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

/// Write the DOT rendering of the graph to `out`.
pub fn write_dot<W: Write>(graph: &Graph, out: &mut W) -> std::io::Result<()> {
    out.write_all(serialize(graph).as_bytes())
}

/// Create or overwrite `path` with the DOT rendering of `graph`.
pub fn write_dot_file(graph: &Graph, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create graph file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_dot(graph, &mut writer)
        .with_context(|| format!("Failed to write graph file: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush graph file: {}", path.display()))?;
    tracing::info!(
        "wrote {} node(s) and {} edge(s) to {}",
        graph.entities().len(),
        graph.edges().len(),
        path.display()
    );
    Ok(())
}
