//! Module dependency graph
//!
//! Builds a petgraph [`DiGraph`] from the declared module dependencies, rejects
//! unknown dependencies and cycles, and computes the reactor build order.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;

use crate::module::Module;
use crate::types::{ReactorError, ReactorResult};

/// Dependency graph over the reactor modules with a precomputed build order
#[derive(Debug)]
pub struct ModuleGraph {
    graph: DiGraph<String, ()>,
    node_indices: HashMap<String, NodeIndex>,
    /// Modules sorted so that every module comes after its dependencies
    sorted: Vec<Module>,
    root: usize,
}

impl ModuleGraph {
    pub fn new(modules: Vec<Module>) -> ReactorResult<Self> {
        let mut graph = DiGraph::<String, ()>::new();
        let mut node_indices = HashMap::new();

        // Add all modules as nodes
        for module in &modules {
            let node_index = graph.add_node(module.name.clone());
            if node_indices.insert(module.name.clone(), node_index).is_some() {
                return Err(ReactorError::Graph(format!(
                    "Module '{}' is declared more than once",
                    module.name
                )));
            }
        }

        // Add edges: module -> dependency
        for module in &modules {
            let from_node = node_indices[&module.name];
            for dep in &module.dependencies {
                if let Some(&to_node) = node_indices.get(dep) {
                    graph.add_edge(from_node, to_node, ());
                } else {
                    return Err(ReactorError::Graph(format!(
                        "Module '{}' depends on '{}' which was not found",
                        module.name, dep
                    )));
                }
            }
        }

        let cycles = detect_cycles(&graph);
        if !cycles.is_empty() {
            let message = cycles
                .into_iter()
                .map(|cycle| {
                    let mut cycle_path = cycle.clone();
                    if let Some(first) = cycle_path.first().cloned() {
                        cycle_path.push(first);
                    }
                    cycle_path.join(" -> ")
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ReactorError::Graph(format!(
                "Circular dependency detected: {}",
                message
            )));
        }

        let sorted = sort_modules(modules);

        let mut roots = sorted
            .iter()
            .enumerate()
            .filter(|(_, module)| module.is_root)
            .map(|(position, _)| position);
        let root = roots
            .next()
            .ok_or_else(|| ReactorError::Graph("The reactor has no root module".to_string()))?;
        if roots.next().is_some() {
            return Err(ReactorError::Graph(
                "The reactor declares more than one root module".to_string(),
            ));
        }

        Ok(Self {
            graph,
            node_indices,
            sorted,
            root,
        })
    }

    /// Modules in build order (dependencies first)
    pub fn sorted_modules(&self) -> &[Module] {
        &self.sorted
    }

    /// The aggregation root module
    pub fn root(&self) -> &Module {
        &self.sorted[self.root]
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.sorted.iter().find(|module| module.name == name)
    }

    pub fn graph(&self) -> &DiGraph<String, ()> {
        &self.graph
    }

    /// Direct dependencies of a module
    pub fn upstream(&self, name: &str) -> Vec<&str> {
        let Some(&node_index) = self.node_indices.get(name) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(node_index, Direction::Outgoing)
            .map(|neighbor| self.graph[neighbor].as_str())
            .collect()
    }

    /// Modules depending on `name`, directly or transitively, in build order
    pub fn downstream(&self, name: &str) -> Vec<&str> {
        let Some(&start) = self.node_indices.get(name) else {
            return Vec::new();
        };

        let mut reached = HashSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node_index) = queue.pop_front() {
            for dependent in self.graph.neighbors_directed(node_index, Direction::Incoming) {
                if reached.insert(dependent) {
                    queue.push_back(dependent);
                }
            }
        }

        self.sorted
            .iter()
            .filter(|module| {
                self.node_indices
                    .get(&module.name)
                    .is_some_and(|node| reached.contains(node))
            })
            .map(|module| module.name.as_str())
            .collect()
    }
}

/// Find strongly connected components that form cycles, including self-loops
fn detect_cycles(graph: &DiGraph<String, ()>) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = kosaraju_scc(graph)
        .into_iter()
        .filter_map(|component| {
            if component.len() > 1 {
                let mut cycle = component
                    .iter()
                    .map(|node| graph[*node].clone())
                    .collect::<Vec<_>>();
                cycle.sort();
                Some(cycle)
            } else {
                let node = component[0];
                if graph.contains_edge(node, node) {
                    Some(vec![graph[node].clone()])
                } else {
                    None
                }
            }
        })
        .collect();

    cycles.sort();
    cycles
}

/// Topological sort that keeps declaration order wherever dependencies allow it
fn sort_modules(modules: Vec<Module>) -> Vec<Module> {
    let mut remaining: Vec<Module> = modules;
    let mut emitted: HashSet<String> = HashSet::new();
    let mut sorted = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let Some(position) = remaining
            .iter()
            .position(|module| module.dependencies.iter().all(|dep| emitted.contains(dep)))
        else {
            // Unreachable once cycles have been rejected
            break;
        };
        let module = remaining.remove(position);
        emitted.insert(module.name.clone());
        sorted.push(module);
    }

    sorted
}
