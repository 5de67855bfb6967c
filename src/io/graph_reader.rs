use super::{specs::warn_all, InstanceReader, WarningHandler};
use crate::{graph::CompatibilityGraph, utils::InputFormatError};
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Read},
};

lazy_static! {
    static ref EDGE_LINE_PATTERN: Regex = Regex::new(r"^\s*(\d+)\s+(\d+)\s*$").unwrap();
    static ref NODE_PATTERN: Regex = Regex::new(r"\S+").unwrap();
}

/// A reader for compatibility graphs.
///
/// The first line lists the identifiers of the nodes, separated by whitespaces;
/// the order of the identifiers gives the node indices.
/// Identifiers are non-negative integers; any other identifier is a format error.
/// Each of the following non-blank lines is an edge, given by the identifiers of its endpoints.
///
/// # Format
///
/// The following content defines a path going from `10` to `30` through `20`.
///
/// ```text
/// 10 20 30
/// 10 20
/// 20 30
/// ```
///
/// Self loops are ignored and reported as warnings.
///
/// # Example
///
/// ```
/// # use escover::io::{GraphReader, InstanceReader};
/// let graph = GraphReader::default().read(&mut "10 20 30\n10 20\n20 30\n".as_bytes()).unwrap();
/// assert_eq!(3, graph.n_nodes());
/// assert!(graph.has_edge(0, 1));
/// assert!(!graph.has_edge(0, 2));
/// ```
#[derive(Default)]
pub struct GraphReader {
    warning_handlers: Vec<WarningHandler>,
}

impl InstanceReader<CompatibilityGraph> for GraphReader {
    fn read(&self, reader: &mut dyn Read) -> Result<CompatibilityGraph> {
        let br = BufReader::new(reader);
        let mut graph: Option<CompatibilityGraph> = None;
        let mut index_of = HashMap::new();
        for (i, line) in br.lines().enumerate() {
            let context = || format!("while reading line with index {}", i);
            let l = line.with_context(context)?;
            if graph.is_none() {
                let labels = read_node_line(1 + i, &l, &mut index_of).with_context(context)?;
                graph = Some(CompatibilityGraph::new_with_labels(labels));
                continue;
            }
            if l.trim().is_empty() {
                continue;
            }
            let (n1, n2) = read_edge_line(1 + i, &l, &index_of).with_context(context)?;
            let g = graph.as_mut().unwrap();
            if n1 == n2 {
                warn_all(
                    &self.warning_handlers,
                    1 + i,
                    format!("ignoring self loop on node {}", g.label(n1)),
                );
                continue;
            }
            g.add_edge(n1, n2);
        }
        Ok(graph.unwrap_or_else(|| CompatibilityGraph::new_with_labels(vec![])))
    }

    fn add_warning_handler(&mut self, h: WarningHandler) {
        self.warning_handlers.push(h);
    }
}

fn read_node_line(
    line: usize,
    content: &str,
    index_of: &mut HashMap<usize, usize>,
) -> Result<Vec<usize>, InputFormatError> {
    let mut labels = vec![];
    for m in NODE_PATTERN.find_iter(content) {
        let column = 1 + content[..m.start()].chars().count();
        let label = m.as_str().parse::<usize>().map_err(|_| {
            InputFormatError::new(line, column, format!(r#"invalid node identifier "{}""#, m.as_str()))
        })?;
        if index_of.insert(label, labels.len()).is_some() {
            return Err(InputFormatError::new(
                line,
                column,
                format!("duplicate node identifier {}", label),
            ));
        }
        labels.push(label);
    }
    Ok(labels)
}

fn read_edge_line(
    line: usize,
    content: &str,
    index_of: &HashMap<usize, usize>,
) -> Result<(usize, usize), InputFormatError> {
    let captures = EDGE_LINE_PATTERN.captures(content).ok_or_else(|| {
        InputFormatError::new(line, 1, "an edge must be given by exactly two node identifiers")
    })?;
    let endpoint = |i: usize| {
        let m = captures.get(i).unwrap();
        let column = 1 + content[..m.start()].chars().count();
        m.as_str()
            .parse::<usize>()
            .ok()
            .and_then(|label| index_of.get(&label).copied())
            .ok_or_else(|| {
                InputFormatError::new(line, column, format!("unknown node {}", m.as_str()))
            })
    };
    Ok((endpoint(1)?, endpoint(2)?))
}
