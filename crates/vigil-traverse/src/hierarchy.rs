//! Breadth-first walk over container hierarchies

use crate::batch::{BatchBudget, BatchSize, Step};
use std::collections::{HashSet, VecDeque};
use vigil_model::{Container, ContainerId, SceneGraph};

/// Resumable breadth-first walk over containers reachable from a root set
///
/// Each container is visited at most once even when reachable through
/// several parents or through a cycle. Ids that no longer resolve in the
/// graph are skipped without counting as visits.
#[derive(Debug, Clone)]
pub struct HierarchyWalk {
    queue: VecDeque<ContainerId>,
    visited: HashSet<ContainerId>,
    budget: BatchBudget,
    skipped: usize,
}

impl HierarchyWalk {
    /// Start a walk from the given roots
    #[must_use]
    pub fn new(roots: impl IntoIterator<Item = ContainerId>, batch: BatchSize) -> Self {
        Self {
            queue: roots.into_iter().collect(),
            visited: HashSet::new(),
            budget: BatchBudget::new(batch),
            skipped: 0,
        }
    }

    /// Continue until the next batch boundary or the end of the walk
    pub fn resume(&mut self, graph: &SceneGraph, mut visit: impl FnMut(&Container)) -> Step {
        while let Some(id) = self.next_container(graph) {
            let Some(container) = graph.container(id) else {
                continue;
            };
            visit(container);
            self.enqueue_children(container);
            if self.budget.record_visit() {
                tracing::trace!(visits = self.budget.visits(), "hierarchy walk suspended");
                return Step::Suspended;
            }
        }
        Step::Complete
    }

    /// Pop the next unvisited, still-alive container id
    pub(crate) fn next_container(&mut self, graph: &SceneGraph) -> Option<ContainerId> {
        while let Some(id) = self.queue.pop_front() {
            if !self.visited.insert(id) {
                continue;
            }
            if !graph.contains(id) {
                self.skipped += 1;
                tracing::trace!(container = %id, "skipping destroyed container");
                continue;
            }
            return Some(id);
        }
        None
    }

    /// Enqueue children of a container (used by walks layered on this one)
    pub(crate) fn enqueue_children(&mut self, container: &Container) {
        self.queue.extend(
            container
                .children()
                .iter()
                .copied()
                .filter(|child| !self.visited.contains(child)),
        );
    }

    /// Containers visited so far
    #[inline]
    #[must_use]
    pub fn visits(&self) -> usize {
        self.budget.visits()
    }

    /// Suspension points reached so far
    #[inline]
    #[must_use]
    pub fn suspensions(&self) -> usize {
        self.budget.suspensions()
    }

    /// Destroyed containers skipped so far
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Check if nothing is left to visit
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }
}
