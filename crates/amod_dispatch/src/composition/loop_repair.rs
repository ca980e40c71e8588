use amod_routing::network::{LinkIdx, Network, NodeIdx};
use tracing::warn;

/// Nodes visited by a link sequence: the start of every link, then the end of the last one.
fn visited_nodes(network: &Network, links: &[LinkIdx]) -> Vec<NodeIdx> {
    let mut nodes: Vec<NodeIdx> = links
        .iter()
        .map(|&link| network.link(link).from_node())
        .collect();
    if let Some(&last) = links.last() {
        nodes.push(network.link(last).to_node());
    }
    nodes
}

/// Cuts every cycle out of a link sequence whose first and last links are fixed.
///
/// For the first interior node that is visited again later, the links between that visit and the
/// next one are removed. Repeats until no interior node is visited twice, so a node visited three
/// times loses both cycles. Consecutive duplicate links are collapsed along the way.
pub fn remove_loops(network: &Network, links: &mut Vec<LinkIdx>) {
    links.dedup();

    loop {
        let nodes = visited_nodes(network, links);
        let interior_end = nodes.len().saturating_sub(1);

        let cycle = (1..interior_end).find_map(|first| {
            (first + 1..interior_end)
                .find(|&next| nodes[next] == nodes[first])
                .map(|next| (first, next))
        });

        match cycle {
            Some((first, next)) => {
                links.drain(first..next);
                links.dedup();
            }
            None => break,
        }
    }
}

/// Logs every pair of consecutive links that do not connect. Returns whether the sequence is
/// drivable.
pub fn check_consistency(network: &Network, links: &[LinkIdx]) -> bool {
    let mut consistent = true;
    for pair in links.windows(2) {
        if !network.are_adjacent(pair[0], pair[1]) {
            warn!(
                from = network.link(pair[0]).external_id(),
                to = network.link(pair[1]).external_id(),
                "Composed path is not contiguous"
            );
            consistent = false;
        }
    }
    consistent
}
