//! Read-only traversal and lookup operations over a built graph.
//! Nothing here mutates the graph.

use std::collections::{HashMap, HashSet, VecDeque};

use super::types::{Edge, EdgeKind, Graph};

impl Graph {
    /// Breadth-first neighborhood of `center`, following edges in both
    /// directions, bounded by `depth` hops. Depth 0 yields only the center
    /// node. A visited set guards against cycles, so no node appears twice.
    /// The result contains every edge whose endpoints are both included.
    pub fn subgraph(&self, center: &str, depth: usize) -> Graph {
        let mut result = Graph::new();
        if !self.has_node(center) {
            return result;
        }

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            adjacency.entry(edge.source.as_str()).or_default().push(edge.target.as_str());
            adjacency.entry(edge.target.as_str()).or_default().push(edge.source.as_str());
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        visited.insert(center);
        queue.push_back((center, 0));

        while let Some((id, hops)) = queue.pop_front() {
            if hops == depth {
                continue;
            }
            if let Some(neighbors) = adjacency.get(id) {
                for &neighbor in neighbors {
                    if visited.insert(neighbor) {
                        queue.push_back((neighbor, hops + 1));
                    }
                }
            }
        }

        for node in &self.nodes {
            if visited.contains(node.id.as_str()) {
                result.add_node(node.clone());
            }
        }
        for edge in &self.edges {
            if visited.contains(edge.source.as_str()) && visited.contains(edge.target.as_str()) {
                result.add_edge(edge.clone());
            }
        }

        result
    }

    /// `calls` edges going out of a function node.
    pub fn function_calls(&self, id: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Calls && e.source == id)
            .collect()
    }

    /// `calls` edges coming into a function node.
    pub fn function_callers(&self, id: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Calls && e.target == id)
            .collect()
    }

    /// `imports` edges going out of a file node.
    pub fn file_dependencies(&self, file: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Imports && e.source == file)
            .collect()
    }

    /// `imports` edges coming into a file node.
    pub fn file_dependents(&self, file: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Imports && e.target == file)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::{Edge, EdgeKind, Graph, Node, NodeKind};

    fn node(id: &str) -> Node {
        Node::new(id.to_string(), NodeKind::Function, id.to_string(), "test.js".into())
    }

    /// a -> b -> c -> a cycle, plus d hanging off b.
    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(node(id));
        }
        graph.add_edge(Edge::new("a", "b", EdgeKind::Calls));
        graph.add_edge(Edge::new("b", "c", EdgeKind::Calls));
        graph.add_edge(Edge::new("c", "a", EdgeKind::Calls));
        graph.add_edge(Edge::new("b", "d", EdgeKind::Calls));
        graph
    }

    #[test]
    fn test_subgraph_depth_zero_is_center_only() {
        let graph = sample_graph();
        let sub = graph.subgraph("a", 0);
        assert_eq!(sub.node_count(), 1);
        assert_eq!(sub.nodes[0].id, "a");
        assert_eq!(sub.edge_count(), 0);
    }

    #[test]
    fn test_subgraph_depth_one_is_direct_neighbors() {
        let graph = sample_graph();
        let sub = graph.subgraph("a", 1);
        let mut ids: Vec<&str> = sub.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        // Both directions: a calls b, c calls a.
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_subgraph_cycle_terminates_without_duplicates() {
        let graph = sample_graph();
        let sub = graph.subgraph("a", 10);
        assert_eq!(sub.node_count(), 4);
        assert_eq!(sub.edge_count(), 4);
    }

    #[test]
    fn test_subgraph_unknown_center_is_empty() {
        let graph = sample_graph();
        let sub = graph.subgraph("zzz", 3);
        assert_eq!(sub.node_count(), 0);
    }

    #[test]
    fn test_callers_and_callees() {
        let graph = sample_graph();
        let callees: Vec<&str> = graph.function_calls("b").iter().map(|e| e.target.as_str()).collect();
        assert_eq!(callees, vec!["c", "d"]);
        let callers: Vec<&str> = graph.function_callers("a").iter().map(|e| e.source.as_str()).collect();
        assert_eq!(callers, vec!["c"]);
    }

    #[test]
    fn test_file_dependencies_and_dependents() {
        let mut graph = Graph::new();
        graph.add_node(Node::file(std::path::Path::new("a.js")));
        graph.add_node(Node::file(std::path::Path::new("b.js")));
        graph.add_node(Node::file(std::path::Path::new("c.js")));
        graph.add_edge(Edge::new("a.js", "b.js", EdgeKind::Imports));
        graph.add_edge(Edge::new("c.js", "b.js", EdgeKind::Imports));

        let deps: Vec<&str> = graph.file_dependencies("a.js").iter().map(|e| e.target.as_str()).collect();
        assert_eq!(deps, vec!["b.js"]);
        let dependents: Vec<&str> = graph.file_dependents("b.js").iter().map(|e| e.source.as_str()).collect();
        assert_eq!(dependents, vec!["a.js", "c.js"]);
    }
}
