//! Dependency graph traversal.
//!
//! Tasks are indexed by id in a map and edges are plain id lists, so the
//! graph never holds references into itself. Every traversal is an explicit
//! stack loop with visited marking and a node budget ([`GraphLimits`]).

use std::collections::{HashMap, HashSet};

use crate::{
    error::{Result, TrackerError},
    models::{BlockingTask, TaskStatus},
    store::GraphNode,
};

pub mod validator;

#[cfg(test)]
mod tests;

/// Default bound on the number of nodes a single traversal may visit.
pub const DEFAULT_MAX_TRAVERSAL: usize = 10_000;

/// Bounds applied to graph traversals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLimits {
    /// Maximum nodes visited before a traversal gives up
    pub max_traversal: usize,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_traversal: DEFAULT_MAX_TRAVERSAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// One owner's tasks and their dependency edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: HashMap<u64, GraphNode>,
}

impl DependencyGraph {
    pub fn from_nodes(nodes: impl IntoIterator<Item = GraphNode>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|node| (node.id, node)).collect(),
        }
    }

    pub fn node(&self, id: u64) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> Vec<&GraphNode> {
        let mut nodes: Vec<&GraphNode> = self.nodes.values().collect();
        nodes.sort_by_key(|node| node.id);
        nodes
    }

    fn dependencies(&self, id: u64) -> &[u64] {
        self.nodes
            .get(&id)
            .map(|node| node.dependency_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Replaces the outgoing edges of `id` in this in-memory copy.
    pub fn set_dependencies(&mut self, id: u64, dependency_ids: Vec<u64>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.dependency_ids = dependency_ids;
        }
    }

    /// Display name for `id`, falling back to a placeholder for ids outside
    /// the graph.
    pub fn name_of(&self, id: u64) -> String {
        match self.nodes.get(&id) {
            Some(node) => node.name.clone(),
            None => BlockingTask::missing(id).label(),
        }
    }

    fn budget_exceeded(limits: GraphLimits) -> TrackerError {
        TrackerError::invalid_input("dependency_ids").with_reason(format!(
            "dependency graph traversal exceeded {} nodes",
            limits.max_traversal
        ))
    }

    /// Searches for a cycle reachable from `start` with three-colour DFS.
    ///
    /// Returns the cycle as a path that starts and ends on the same id, e.g.
    /// `[b, a, b]`. Edges to ids outside the graph are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] when more than
    /// `limits.max_traversal` nodes would be visited.
    pub fn find_cycle_from(&self, start: u64, limits: GraphLimits) -> Result<Option<Vec<u64>>> {
        let mut marks: HashMap<u64, Mark> = HashMap::new();
        let mut stack: Vec<(u64, usize)> = vec![(start, 0)];
        marks.insert(start, Mark::InProgress);

        while let Some(&(node, next)) = stack.last() {
            let dependencies = self.dependencies(node);

            if next >= dependencies.len() {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            }

            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            let dependency = dependencies[next];

            match marks.get(&dependency) {
                Some(Mark::InProgress) => {
                    let position = stack
                        .iter()
                        .position(|(id, _)| *id == dependency)
                        .unwrap_or(0);
                    let mut chain: Vec<u64> = stack[position..].iter().map(|(id, _)| *id).collect();
                    chain.push(dependency);
                    return Ok(Some(chain));
                }
                Some(Mark::Done) => {}
                None => {
                    if !self.contains(dependency) {
                        continue;
                    }
                    if marks.len() >= limits.max_traversal {
                        return Err(Self::budget_exceeded(limits));
                    }
                    marks.insert(dependency, Mark::InProgress);
                    stack.push((dependency, 0));
                }
            }
        }

        Ok(None)
    }

    /// Every incomplete task upstream of `id`, deepest prerequisite first.
    ///
    /// Completed tasks end the walk along their branch. Ids that no longer
    /// resolve are reported as missing blockers.
    pub fn outstanding_prerequisites(
        &self,
        id: u64,
        limits: GraphLimits,
    ) -> Result<Vec<BlockingTask>> {
        let mut outstanding = Vec::new();
        let mut visited: HashSet<u64> = HashSet::from([id]);
        let mut stack: Vec<(u64, usize)> = vec![(id, 0)];

        while let Some(&(node, next)) = stack.last() {
            let dependencies = self.dependencies(node);

            if next >= dependencies.len() {
                stack.pop();
                if node != id {
                    if let Some(found) = self.nodes.get(&node) {
                        outstanding.push(BlockingTask {
                            id: found.id,
                            name: Some(found.name.clone()),
                            status: Some(found.status),
                        });
                    }
                }
                continue;
            }

            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            let dependency = dependencies[next];
            if !visited.insert(dependency) {
                continue;
            }
            if visited.len() > limits.max_traversal {
                return Err(Self::budget_exceeded(limits));
            }

            match self.nodes.get(&dependency) {
                None => outstanding.push(BlockingTask::missing(dependency)),
                Some(found) if found.status == TaskStatus::Completed => {}
                Some(_) => stack.push((dependency, 0)),
            }
        }

        Ok(outstanding)
    }

    /// Ids of every task that depends on `id`, directly or transitively.
    pub fn dependents_closure(&self, id: u64, limits: GraphLimits) -> Result<HashSet<u64>> {
        let mut reverse: HashMap<u64, Vec<u64>> = HashMap::new();
        for node in self.nodes.values() {
            for dependency in &node.dependency_ids {
                reverse.entry(*dependency).or_default().push(node.id);
            }
        }

        let mut dependents = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for dependent in reverse.get(&current).map(Vec::as_slice).unwrap_or(&[]) {
                if *dependent != id && dependents.insert(*dependent) {
                    if dependents.len() > limits.max_traversal {
                        return Err(Self::budget_exceeded(limits));
                    }
                    stack.push(*dependent);
                }
            }
        }

        Ok(dependents)
    }
}
