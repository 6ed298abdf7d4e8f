//! Graph to DOT (Graphviz) conversion.
//!
//! Generates DOT text for a graph or any shrinking view of one; hidden
//! nodes and edges of a [`SubGraph`][crate::subgraph::SubGraph] never
//! appear in the output. Nodes and edges can be annotated with the values
//! of named property maps, which is the usual way to render a solved
//! game: label nodes with `state` and edges with `input`.
//!
//! Rendering the text to an image is left to external tools
//! (`dot -Tpng out.dot -o out.png`).

use crate::errors::Result;
use crate::graph::GraphView;

/// Configuration options for DOT output generation.
///
/// # Examples
///
/// ```
/// use gamegraph::dot::{to_dot, DotConfig};
/// use gamegraph::graph::Graph;
///
/// let mut g = Graph::new();
/// g.add_nodes(2);
/// g.add_edge(0, 1).unwrap();
///
/// let dot = to_dot(&g, &DotConfig::default()).unwrap();
/// assert!(dot.contains("0 -> 1"));
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for nodes (default: "circle")
    pub node_shape: &'static str,
    /// Layout direction (default: "LR")
    pub rankdir: &'static str,
    /// Node property names whose values annotate each node label.
    pub node_labels: Vec<String>,
    /// Edge property names whose values annotate each edge label.
    pub edge_labels: Vec<String>,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            rankdir: "LR",
            node_labels: Vec::new(),
            edge_labels: Vec::new(),
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Converts a graph view to DOT format.
///
/// Fails if a configured label property is not registered on the base
/// graph or if a labeled element is missing from it.
pub fn to_dot<G: GraphView>(view: &G, config: &DotConfig) -> Result<String> {
    let base = view.base();
    let mut dot = String::new();

    dot.push_str("digraph {\n");
    dot.push_str(&format!("rankdir={};\n", config.rankdir));
    dot.push_str(&format!("node [shape={}];\n", config.node_shape));

    for uid in view.nodes() {
        let mut label = uid.to_string();
        for name in &config.node_labels {
            label.push_str("\\n");
            label.push_str(&escape(&base.node_prop(name, uid)?.to_string()));
        }
        dot.push_str(&format!("{} [label=\"{}\"];\n", uid, label));
    }

    for edge in view.edges() {
        if config.edge_labels.is_empty() {
            dot.push_str(&format!("{} -> {};\n", edge.src, edge.dst));
        } else {
            let mut label = String::new();
            for (i, name) in config.edge_labels.iter().enumerate() {
                if i > 0 {
                    label.push_str(", ");
                }
                label.push_str(&escape(&base.edge_prop(name, &edge)?.to_string()));
            }
            dot.push_str(&format!(
                "{} -> {} [label=\"{}\"];\n",
                edge.src, edge.dst, label
            ));
        }
    }

    dot.push_str("}\n");
    Ok(dot)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::graph::Graph;
    use crate::subgraph::SubGraph;
    use crate::types::Edge;
    use crate::value::PropValue;

    fn labeled_graph() -> Graph {
        let mut g = Graph::new();
        g.add_nodes(3);
        g.add_edges([(0, 1), (1, 2)]).unwrap();
        g.add_node_property("state", PropValue::Null).unwrap();
        g.set_node_prop("state", 0, "init").unwrap();
        g.set_node_prop("state", 1, "mid").unwrap();
        g.set_node_prop("state", 2, "goal").unwrap();
        g.add_edge_property("input", PropValue::Null).unwrap();
        g.set_edge_prop("input", &Edge::new(0, 1, 0), "go").unwrap();
        g.set_edge_prop("input", &Edge::new(1, 2, 0), "go").unwrap();
        g
    }

    #[test]
    fn test_plain_output() {
        let g = labeled_graph();
        let dot = to_dot(&g, &DotConfig::default()).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("0 -> 1;"));
        assert!(dot.contains("1 -> 2;"));
    }

    #[test]
    fn test_property_labels() {
        let g = labeled_graph();
        let config = DotConfig {
            node_labels: vec!["state".to_string()],
            edge_labels: vec!["input".to_string()],
            ..DotConfig::default()
        };
        let dot = to_dot(&g, &config).unwrap();
        assert!(dot.contains("init"));
        assert!(dot.contains("[label=\"go\"]"));
    }

    #[test]
    fn test_unknown_label_property() {
        let g = labeled_graph();
        let config = DotConfig {
            node_labels: vec!["missing".to_string()],
            ..DotConfig::default()
        };
        assert!(to_dot(&g, &config).is_err());
    }

    #[test]
    fn test_hidden_elements_omitted() {
        let g = labeled_graph();
        let mut view = SubGraph::new(&g);
        view.hide_node(2).unwrap();
        let dot = to_dot(&view, &DotConfig::default()).unwrap();
        assert!(dot.contains("0 -> 1;"));
        assert!(!dot.contains("1 -> 2;"));
    }
}
