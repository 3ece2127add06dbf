//! Stable, cycle-detecting topological sort.
//!
//! Nodes are emitted in dependency order; whenever two nodes are not
//! constrained relative to each other they keep their input order. The
//! queue is a min-heap of input indices, so the lowest-index ready node is
//! always emitted first.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// No ordering exists: every remaining node is blocked.
///
/// `unresolved` lists the nodes that could not be emitted, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<K> {
    pub unresolved: Vec<K>,
}

impl<K: fmt::Display> fmt::Display for CycleError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.unresolved.iter().map(|k| k.to_string()).collect();
        write!(
            f,
            "Circular dependencies among these items: {}",
            names.join(", ")
        )
    }
}

impl<K: fmt::Debug + fmt::Display> std::error::Error for CycleError<K> {}

/// Sort `items` so every dependency precedes its dependents.
///
/// `dependencies` maps an item to the items it depends on. Dependencies that
/// are not themselves in `items` are ignored: they are treated as already
/// satisfied. Items missing from the map have no dependencies.
pub fn stable_topological_sort<K>(
    items: &[K],
    dependencies: &HashMap<K, Vec<K>>,
) -> Result<Vec<K>, CycleError<K>>
where
    K: Clone + Eq + Hash,
{
    let ordering: HashMap<&K, usize> = items.iter().enumerate().map(|(i, k)| (k, i)).collect();

    // Dependency lists translated to input indices, restricted to this sort.
    let deps: Vec<Vec<usize>> = items
        .iter()
        .map(|item| {
            dependencies
                .get(item)
                .map(|ds| ds.iter().filter_map(|d| ordering.get(d).copied()).collect())
                .unwrap_or_default()
        })
        .collect();

    let mut queue: BinaryHeap<Reverse<usize>> = (0..items.len()).map(Reverse).collect();
    let mut emitted: HashSet<usize> = HashSet::with_capacity(items.len());
    let mut output: Vec<K> = Vec::with_capacity(items.len());

    let mut blocked: HashSet<usize> = HashSet::new();
    // blocker -> items waiting on it
    let mut blocked_on: HashMap<usize, HashSet<usize>> = HashMap::new();
    let mut seen_since_last_change = 0usize;

    while !queue.is_empty() {
        if seen_since_last_change == queue.len() + blocked.len() {
            return Err(cycle_error(items, &queue, &blocked_on));
        }
        let Some(Reverse(idx)) = queue.pop() else {
            break;
        };

        let blockers: Vec<usize> = deps[idx]
            .iter()
            .copied()
            .filter(|d| !emitted.contains(d))
            .collect();

        if blockers.is_empty() {
            seen_since_last_change = 0;
            emitted.insert(idx);
            output.push(items[idx].clone());
            blocked.remove(&idx);

            if let Some(waiting) = blocked_on.remove(&idx) {
                for candidate in waiting {
                    let still_blocked = blocked_on.values().any(|set| set.contains(&candidate));
                    if !still_blocked {
                        queue.push(Reverse(candidate));
                    }
                }
            }
        } else if blocked.contains(&idx) {
            seen_since_last_change += 1;
        } else {
            blocked.insert(idx);
            for blocker in blockers {
                blocked_on.entry(blocker).or_default().insert(idx);
            }
        }
    }

    if !blocked_on.is_empty() {
        return Err(cycle_error(items, &queue, &blocked_on));
    }
    Ok(output)
}

/// Everything still queued or waiting on something, in input order.
fn cycle_error<K: Clone>(
    items: &[K],
    queue: &BinaryHeap<Reverse<usize>>,
    blocked_on: &HashMap<usize, HashSet<usize>>,
) -> CycleError<K> {
    let mut unresolved: Vec<usize> = queue.iter().map(|Reverse(i)| *i).collect();
    unresolved.extend(blocked_on.values().flatten().copied());
    unresolved.sort_unstable();
    unresolved.dedup();
    CycleError {
        unresolved: unresolved.into_iter().map(|i| items[i].clone()).collect(),
    }
}

#[cfg(test)]
#[path = "topo_test.rs"]
mod tests;
