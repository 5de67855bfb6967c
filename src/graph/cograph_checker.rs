use super::CompatibilityGraph;

/// Checks whether a graph is a cograph, i.e. whether it has no induced path on four nodes.
///
/// The check relies on the cotree decomposition: a graph is a cograph iff each of its connected
/// induced subgraphs with at least two nodes has a disconnected complement, the components of which
/// are cographs themselves.
///
/// # Example
///
/// ```
/// # use escover::graph::{is_cograph, CompatibilityGraph};
/// let mut graph = CompatibilityGraph::new_with_labels(vec![1, 2, 3, 4]);
/// graph.add_edge(0, 1);
/// graph.add_edge(1, 2);
/// assert!(is_cograph(&graph));
/// graph.add_edge(2, 3);
/// assert!(!is_cograph(&graph));
/// ```
pub fn is_cograph(graph: &CompatibilityGraph) -> bool {
    let all_nodes = (0..graph.n_nodes()).collect::<Vec<usize>>();
    check_subset(graph, &all_nodes)
}

fn check_subset(graph: &CompatibilityGraph, nodes: &[usize]) -> bool {
    if nodes.len() <= 1 {
        return true;
    }
    let components = components_of(graph, nodes, false);
    if components.len() > 1 {
        return components
            .iter()
            .all(|c| check_subset(graph, c));
    }
    let co_components = components_of(graph, nodes, true);
    if co_components.len() == 1 {
        return false;
    }
    co_components
        .iter()
        .all(|c| check_subset(graph, c))
}

// Connected components of the subgraph induced by `nodes`, or of its complement.
fn components_of(
    graph: &CompatibilityGraph,
    nodes: &[usize],
    complement: bool,
) -> Vec<Vec<usize>> {
    let mut remaining = nodes.to_vec();
    let mut components = Vec::new();
    while let Some(first) = remaining.pop() {
        let mut component = vec![first];
        let mut to_process = vec![first];
        while let Some(current) = to_process.pop() {
            let (linked, unlinked): (Vec<usize>, Vec<usize>) = remaining
                .iter()
                .partition(|n| graph.has_edge(current, **n) != complement);
            remaining = unlinked;
            component.extend_from_slice(&linked);
            to_process.extend(linked);
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}
