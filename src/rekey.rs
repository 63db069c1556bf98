//! Dijkstra's algorithm in the form used by the visualizer: the frontier starts out holding
//! every node and, rather than supporting decrease-key, is re-keyed from the current
//! distances and re-heapified after every extraction. This costs a full heap rebuild per
//! step but keeps the queue a plain [BinaryHeap].
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use log::{trace, warn};
use num_traits::Zero;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

const NO_PARENT: usize = usize::MAX;

/// The graph a search runs over together with the hooks it reports progress through.
pub trait SearchSpace {
    type Node: Eq + Hash + Clone;
    type Cost: Zero + Ord + Copy;
    type Successors: IntoIterator<Item = (Self::Node, Self::Cost)>;

    fn successors(&self, node: &Self::Node) -> Self::Successors;
    fn is_goal(&self, node: &Self::Node) -> bool;
    /// Called when a node other than the goal leaves the frontier with a finite distance.
    fn on_extract(&mut self, _node: &Self::Node, _cost: Self::Cost) {}
    /// Called when a shorter distance to a node has been found.
    fn on_relax(&mut self, _node: &Self::Node, _cost: Self::Cost) {}
}

/// A frontier entry. `key` is `None` while the distance is infinite.
struct FrontierEntry<C> {
    key: Option<C>,
    index: usize,
}

impl<C: Ord> Eq for FrontierEntry<C> {}

impl<C: Ord> PartialEq for FrontierEntry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<C: Ord> PartialOrd for FrontierEntry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Ord> Ord for FrontierEntry<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the smallest finite key first, infinite keys last,
        // and equal keys in insertion order.
        let by_key = match (&self.key, &other.key) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        by_key.then_with(|| other.index.cmp(&self.index))
    }
}

/// Walks predecessor indices back from `end`, returning the nodes from the start to `end`.
fn reverse_path<N, C>(parents: &FxIndexMap<N, (usize, Option<C>)>, end: usize) -> Vec<N>
where
    N: Eq + Hash + Clone,
{
    let mut path = std::iter::successors(Some(end), |&ix| {
        parents
            .get_index(ix)
            .map(|(_, &(parent, _))| parent)
            .filter(|&parent| parent != NO_PARENT)
    })
    .filter_map(|ix| parents.get_index(ix).map(|(node, _)| node.clone()))
    .collect::<Vec<N>>();
    path.reverse();
    path
}

/// Runs the search from `start` over the frontier formed by `nodes`. Successors that are not
/// part of `nodes` are ignored. Returns the route from `start` to the first goal extracted
/// together with its cost, or [None] if the goal is extracted with an infinite distance or
/// never extracted at all.
pub fn dijkstra_rekey<S, I>(space: &mut S, nodes: I, start: &S::Node) -> Option<(Vec<S::Node>, S::Cost)>
where
    S: SearchSpace,
    I: IntoIterator<Item = S::Node>,
{
    let mut parents: FxIndexMap<S::Node, (usize, Option<S::Cost>)> = nodes
        .into_iter()
        .map(|node| (node, (NO_PARENT, None)))
        .collect();
    match parents.get_mut(start) {
        Some(entry) => entry.1 = Some(Zero::zero()),
        None => {
            warn!("Start node is not part of the frontier");
            return None;
        }
    }
    let mut frontier = parents
        .values()
        .enumerate()
        .map(|(index, &(_, key))| FrontierEntry { key, index })
        .collect::<BinaryHeap<_>>();

    while let Some(FrontierEntry { index, .. }) = frontier.pop() {
        let Some((node, &(_, distance))) = parents.get_index(index) else {
            continue;
        };
        if space.is_goal(node) {
            return distance.map(|cost| (reverse_path(&parents, index), cost));
        }
        // Relaxing from an infinite distance never improves anything.
        let Some(distance) = distance else {
            continue;
        };
        let node = node.clone();
        trace!("Extracted node {index}, {} left in frontier", frontier.len());
        space.on_extract(&node, distance);
        for (successor, move_cost) in space.successors(&node) {
            let new_cost = distance + move_cost;
            let Some(entry) = parents.get_mut(&successor) else {
                continue;
            };
            if entry.1.map_or(true, |old| new_cost < old) {
                *entry = (index, Some(new_cost));
                space.on_relax(&successor, new_cost);
            }
        }
        let mut entries = frontier.into_vec();
        for entry in entries.iter_mut() {
            entry.key = parents.get_index(entry.index).and_then(|(_, &(_, key))| key);
        }
        frontier = BinaryHeap::from(entries);
    }
    warn!("Frontier exhausted without extracting the goal");
    None
}
