//! Scheduling of deferred cone expansions.

use crate::mesh_shortest_paths::cone_tree::NodeId;
use crate::primitive::segment::Segment2;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpansionKind {
    /// Create the child across `twin(prev(entry))`.
    LeftChild,
    /// Create the child across `twin(next(entry))`.
    RightChild,
    /// Fan out from the parent's target vertex.
    PseudoSource,
}

/// A pending expansion of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionEvent {
    pub parent: NodeId,
    pub kind: ExpansionKind,
    /// Lower bound on the geodesic distance of anything the expansion can produce.
    pub distance_estimate: f64,
    /// The parent's window clipped to the child edge, in the parent's unfolding.
    /// `None` for pseudo-source expansions.
    pub window: Option<Segment2>,
    pub cancelled: bool,
}

impl ExpansionEvent {
    pub fn child(parent: NodeId, kind: ExpansionKind, distance_estimate: f64, window: Segment2) -> Self {
        Self {
            parent,
            kind,
            distance_estimate,
            window: Some(window),
            cancelled: false,
        }
    }

    pub fn pseudo_source(parent: NodeId, distance_estimate: f64) -> Self {
        Self {
            parent,
            kind: ExpansionKind::PseudoSource,
            distance_estimate,
            window: None,
            cancelled: false,
        }
    }
}

/// A reference to an event in the priority queue.
///
/// The ordering is reversed because the priority queue is a max-heap, so a lower
/// estimate is considered "greater". Equal estimates pop in insertion order.
#[derive(Debug, PartialEq, Eq)]
struct ExpansionHead {
    distance_estimate: OrderedFloat<f64>,
    event: EventId,
}

impl PartialOrd for ExpansionHead {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExpansionHead {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .distance_estimate
            .cmp(&self.distance_estimate)
            .then_with(|| other.event.cmp(&self.event))
    }
}

/// Min-priority queue of expansion events with lazy cancellation.
///
/// Cancelled events stay in the heap and are skipped when they surface.
#[derive(Debug, Default)]
pub struct ExpansionQueue {
    events: Vec<ExpansionEvent>,
    heap: BinaryHeap<ExpansionHead>,
    discarded: usize,
}

impl ExpansionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.heap.clear();
        self.discarded = 0;
    }

    pub fn push(&mut self, event: ExpansionEvent) -> EventId {
        let id = EventId(self.events.len());
        self.heap.push(ExpansionHead {
            distance_estimate: OrderedFloat(event.distance_estimate),
            event: id,
        });
        self.events.push(event);
        id
    }

    /// Marks an event so that it is dropped instead of processed.
    pub fn cancel(&mut self, id: EventId) {
        self.events[id.0].cancelled = true;
    }

    pub fn event(&self, id: EventId) -> &ExpansionEvent {
        &self.events[id.0]
    }

    /// Removes and returns the live event with the smallest estimate.
    pub fn pop(&mut self) -> Option<ExpansionEvent> {
        while let Some(head) = self.heap.pop() {
            let event = self.events[head.event.0];
            if event.cancelled {
                self.discarded += 1;
            } else {
                return Some(event);
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Entries still in the heap, cancelled ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn pushed_count(&self) -> usize {
        self.events.len()
    }

    /// Number of cancelled events popped and dropped so far.
    pub fn discarded_count(&self) -> usize {
        self.discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn event(distance: f64) -> ExpansionEvent {
        ExpansionEvent::pseudo_source(NodeId(0), distance)
    }

    #[test]
    fn cancelled_events_are_skipped() {
        let mut queue = ExpansionQueue::new();
        let first = queue.push(event(1.0));
        queue.push(event(2.0));
        queue.cancel(first);

        assert_eq!(queue.pop().map(|e| e.distance_estimate), Some(2.0));
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.discarded_count(), 1);
        assert!(queue.is_empty());
        assert!(queue.event(first).cancelled);
    }

    #[test]
    fn ties_pop_in_insertion_order() {
        let mut queue = ExpansionQueue::new();
        for parent in 0..5 {
            queue.push(ExpansionEvent::pseudo_source(NodeId(parent), 1.0));
        }
        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|e| e.parent).collect();
        assert_eq!(order, (0..5).map(NodeId).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn pops_in_nondecreasing_order(distances in prop::collection::vec(0.0..100.0f64, 0..50)) {
            let mut queue = ExpansionQueue::new();
            for d in &distances {
                queue.push(event(*d));
            }
            prop_assert_eq!(queue.len(), distances.len());

            let popped: Vec<f64> = std::iter::from_fn(|| queue.pop()).map(|e| e.distance_estimate).collect();
            prop_assert_eq!(popped.len(), distances.len());
            prop_assert!(popped.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
