//! Dependency graphs for resources and stacks
//!
//! Edges point from a dependency to its dependent, so a topological sort
//! yields a valid deployment order.

use petgraph::algo::{has_path_connecting, tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::template::Template;

/// A named dependency graph
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: BTreeMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning the existing index if already present
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Record that `dependent` must be deployed after `dependency`
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        let from = self.add_node(dependency);
        let to = self.add_node(dependent);
        self.graph.update_edge(from, to, ());
    }

    /// Whether the graph has a node with this name
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Whether `dependent` transitively depends on `dependency`
    pub fn depends_on(&self, dependent: &str, dependency: &str) -> bool {
        match (self.index.get(dependency), self.index.get(dependent)) {
            (Some(from), Some(to)) if from != to => {
                has_path_connecting(&self.graph, *from, *to, None)
            }
            _ => false,
        }
    }

    /// Nodes in dependency order
    pub fn order(&self) -> Result<Vec<String>> {
        match toposort(&self.graph, None) {
            Ok(nodes) => Ok(nodes
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => Err(self.cycle_error(cycle.node_id())),
        }
    }

    fn cycle_error(&self, node: NodeIndex) -> Error {
        let component = tarjan_scc(&self.graph)
            .into_iter()
            .find(|scc| scc.contains(&node))
            .unwrap_or_else(|| vec![node]);

        let mut names: Vec<String> = component
            .iter()
            .map(|idx| self.graph[*idx].clone())
            .collect();
        names.sort();
        if let Some(first) = names.first().cloned() {
            names.push(first);
        }
        Error::circular_dependency(&names)
    }
}

/// Build the resource graph of a template
///
/// Every reference must resolve to a resource in the same template; a token
/// that names a resource of another stack surfaces here as an
/// [`Error::UnresolvedReference`].
pub fn resource_graph(stack_name: &str, template: &Template) -> Result<DependencyGraph> {
    let mut graph = DependencyGraph::new();

    for logical_id in template.resources.keys() {
        graph.add_node(logical_id);
    }

    for (logical_id, resource) in &template.resources {
        for dependency in resource.dependencies() {
            if !template.resources.contains_key(&dependency) {
                return Err(Error::UnresolvedReference {
                    stack: stack_name.to_string(),
                    resource: logical_id.clone(),
                    target: dependency,
                });
            }
            debug!("{}: {} depends on {}", stack_name, logical_id, dependency);
            graph.add_dependency(logical_id, &dependency);
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Resource;
    use crate::token::Token;

    fn template_with(resources: Vec<(&str, Resource)>) -> Template {
        let mut template = Template::new();
        for (id, resource) in resources {
            template.resources.insert(id.to_string(), resource);
        }
        template
    }

    #[test]
    fn test_simple_chain_order() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("C", "B");
        graph.add_dependency("B", "A");

        assert_eq!(graph.order().unwrap(), vec!["A", "B", "C"]);
        assert!(graph.depends_on("C", "A"));
        assert!(!graph.depends_on("A", "C"));
    }

    #[test]
    fn test_diamond_dependency() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("B", "A");
        graph.add_dependency("C", "A");
        graph.add_dependency("D", "B");
        graph.add_dependency("D", "C");

        let order = graph.order().unwrap();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("A") < pos("B"));
        assert!(pos("A") < pos("C"));
        assert!(pos("B") < pos("D"));
        assert!(pos("C") < pos("D"));
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("A", "B");
        graph.add_dependency("B", "A");

        let err = graph.order().unwrap_err();
        assert!(
            matches!(err, Error::CircularDependency { ref cycle } if cycle == "A -> B -> A"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_resource_graph_follows_tokens() {
        let template = template_with(vec![
            ("Key", Resource::new("AWS::KMS::Key")),
            (
                "Bucket",
                Resource::new("AWS::S3::Bucket").with_property("Key", Token::get_att("Key", "Arn")),
            ),
        ]);

        let graph = resource_graph("Stack", &template).unwrap();
        assert!(graph.depends_on("Bucket", "Key"));
        assert_eq!(graph.order().unwrap(), vec!["Key", "Bucket"]);
    }

    #[test]
    fn test_resource_graph_rejects_dangling_reference() {
        let template = template_with(vec![(
            "Policy",
            Resource::new("AWS::IAM::Policy").with_property("Roles", vec![Token::reference("Missing")]),
        )]);

        let err = resource_graph("Stack", &template).unwrap_err();
        assert!(matches!(
            err,
            Error::UnresolvedReference { ref target, .. } if target == "Missing"
        ));
    }

    #[test]
    fn test_resource_graph_detects_cycle() {
        let template = template_with(vec![
            (
                "Bucket",
                Resource::new("AWS::S3::Bucket").with_property("Role", Token::get_att("Policy", "Arn")),
            ),
            (
                "Policy",
                Resource::new("AWS::IAM::Policy").with_property("Res", Token::get_att("Bucket", "Arn")),
            ),
        ]);

        let graph = resource_graph("Stack", &template).unwrap();
        assert!(matches!(
            graph.order().unwrap_err(),
            Error::CircularDependency { .. }
        ));
    }
}
