//! Name-keyed dependency graph over the projects of a solution.
//!
//! Nodes are projects, edges point from a project to each project it
//! references. References are matched by project name, the same way project
//! records name them.

use crate::error::{Error, Result};
use dotnetversion_projects::ProjectMap;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// A reference to a project that is not part of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// The referencing project.
    pub from: String,
    /// The referenced name that could not be found.
    pub to: String,
}

/// Projects of a solution and the references between them.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    graph: DiGraph<ProjectMap, ()>,
    index: HashMap<String, NodeIndex>,
    unresolved: Vec<UnresolvedReference>,
}

impl ProjectGraph {
    /// Builds the graph from project records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateProject`] if two records share a name.
    pub fn build(projects: Vec<ProjectMap>) -> Result<Self> {
        let mut graph = DiGraph::with_capacity(projects.len(), 0);
        let mut index = HashMap::with_capacity(projects.len());

        for project in projects {
            let name = project.name().to_string();
            if index.contains_key(&name) {
                return Err(Error::DuplicateProject { name });
            }
            let node = graph.add_node(project);
            index.insert(name, node);
        }

        let mut unresolved = Vec::new();
        for source in graph.node_indices().collect::<Vec<_>>() {
            let references = graph[source].project_references().to_vec();
            for reference in references {
                if let Some(&target) = index.get(&reference) {
                    graph.add_edge(source, target, ());
                } else {
                    tracing::trace!(
                        from = graph[source].name(),
                        to = %reference,
                        "Reference to a project outside the graph"
                    );
                    unresolved.push(UnresolvedReference {
                        from: graph[source].name().to_string(),
                        to: reference,
                    });
                }
            }
        }

        Ok(Self {
            graph,
            index,
            unresolved,
        })
    }

    /// Looks up a project by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProjectMap> {
        self.index.get(name).map(|&node| &self.graph[node])
    }

    /// Number of projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph has no projects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All projects, in the order they were given to [`build`](Self::build).
    pub fn projects(&self) -> impl Iterator<Item = &ProjectMap> {
        self.graph.node_weights()
    }

    /// Projects that `name` references directly, in declaration order.
    ///
    /// Unknown names yield nothing.
    #[must_use]
    pub fn dependencies(&self, name: &str) -> Vec<&ProjectMap> {
        self.get(name)
            .map(|project| {
                project
                    .project_references()
                    .iter()
                    .filter_map(|reference| self.get(reference))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Projects that reference `name` directly, in input order.
    ///
    /// Unknown names yield nothing.
    #[must_use]
    pub fn dependents(&self, name: &str) -> Vec<&ProjectMap> {
        let Some(&node) = self.index.get(name) else {
            return Vec::new();
        };

        let mut sources: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .collect();
        sources.sort_unstable();
        sources.dedup();
        sources.into_iter().map(|source| &self.graph[source]).collect()
    }

    /// References that did not match any project in the graph.
    #[must_use]
    pub fn unresolved_references(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    /// Projects ordered so that every project comes after the projects it
    /// references.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DependencyCycle`] if references form a cycle.
    pub fn topological_order(&self) -> Result<Vec<&ProjectMap>> {
        let mut order = toposort(&self.graph, None).map_err(|cycle| Error::DependencyCycle {
            project: self.graph[cycle.node_id()].name().to_string(),
        })?;

        // Edges point at dependencies, so the sort lists dependents first.
        order.reverse();
        Ok(order.into_iter().map(|node| &self.graph[node]).collect())
    }
}
