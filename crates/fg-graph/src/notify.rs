//! Per-graph change notification.
//!
//! Delivery is synchronous: every event reaches every subscriber before the
//! mutator that raised it returns. Re-entrant subscribers receive the graph
//! and may mutate it; events raised during a delivery are queued and
//! delivered in order once the current event has reached all subscribers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::event::GraphEvent;
use crate::graph::Graph;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

enum Handler {
    Observe(Box<dyn FnMut(&GraphEvent)>),
    Reentrant(Box<dyn FnMut(&mut Graph, &GraphEvent)>),
}

struct Subscription {
    id: SubscriptionId,
    handler: Handler,
}

/// Event sink owned by a single graph.
#[derive(Default)]
pub struct EventSink {
    subscriptions: Vec<Subscription>,
    queue: VecDeque<GraphEvent>,
    delivering: bool,
    /// Ids of the subscribers moved out for the current delivery.
    in_flight: Vec<SubscriptionId>,
    cancelled: Vec<SubscriptionId>,
    next_id: u64,
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("subscriptions", &self.subscriptions.len())
            .field("queued", &self.queue.len())
            .field("delivering", &self.delivering)
            .finish()
    }
}

impl EventSink {
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&GraphEvent) + 'static,
    {
        self.push(Handler::Observe(Box::new(handler)))
    }

    pub fn subscribe_reentrant<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut Graph, &GraphEvent) + 'static,
    {
        self.push(Handler::Reentrant(Box::new(handler)))
    }

    /// Remove a subscription. During a delivery the removal takes effect once
    /// the current event has been delivered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if self.delivering {
            let known = (self.in_flight.contains(&id)
                || self.subscriptions.iter().any(|s| s.id == id))
                && !self.cancelled.contains(&id);
            if known {
                self.cancelled.push(id);
            }
            return known;
        }
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of live subscribers, counting those being delivered to and
    /// excluding those cancelled mid-delivery.
    pub fn len(&self) -> usize {
        (self.in_flight.len() + self.subscriptions.len()).saturating_sub(self.cancelled.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, handler });
        id
    }
}

/// Publish `event` on the graph's sink.
pub(crate) fn deliver(graph: &mut Graph, event: GraphEvent) {
    graph.sink.queue.push_back(event);
    if graph.sink.delivering {
        return;
    }

    graph.sink.delivering = true;
    while let Some(event) = graph.sink.queue.pop_front() {
        // Subscribers are moved out so re-entrant handlers can borrow the graph.
        let mut active = std::mem::take(&mut graph.sink.subscriptions);
        graph.sink.in_flight = active.iter().map(|s| s.id).collect();
        for sub in active.iter_mut() {
            if graph.sink.cancelled.contains(&sub.id) {
                continue;
            }
            match &mut sub.handler {
                Handler::Observe(f) => f(&event),
                Handler::Reentrant(f) => f(graph, &event),
            }
        }
        active.append(&mut graph.sink.subscriptions);
        let cancelled = std::mem::take(&mut graph.sink.cancelled);
        active.retain(|s| !cancelled.contains(&s.id));
        graph.sink.subscriptions = active;
        graph.sink.in_flight.clear();
    }
    graph.sink.delivering = false;
}

/// A subscriber that records every event, for inspection after the fact.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GraphEvent>>>,
}

impl EventLog {
    /// Subscribe a new log to `graph`.
    pub fn attach(graph: &mut Graph) -> Self {
        let log = Self::default();
        let events = Rc::clone(&log.events);
        graph.subscribe(move |event| events.borrow_mut().push(event.clone()));
        log
    }

    pub fn events(&self) -> Vec<GraphEvent> {
        self.events.borrow().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(GraphEvent::name).collect()
    }

    /// Event names without transaction boundaries.
    pub fn changes(&self) -> Vec<&'static str> {
        self.events
            .borrow()
            .iter()
            .filter(|e| !e.is_transaction_boundary())
            .map(GraphEvent::name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_all_subscribers_in_order() {
        let mut graph = Graph::new("g");
        let first = EventLog::attach(&mut graph);
        let second = EventLog::attach(&mut graph);
        graph.add_node("A", "Comp", None);
        assert_eq!(first.names(), ["startTransaction", "addNode", "endTransaction"]);
        assert_eq!(first.events(), second.events());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut graph = Graph::new("g");
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = graph.subscribe(move |_| *c.borrow_mut() += 1);
        graph.add_node("A", "Comp", None);
        assert_eq!(*count.borrow(), 3);
        assert!(graph.unsubscribe(id));
        assert!(!graph.unsubscribe(id));
        graph.add_node("B", "Comp", None);
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn reentrant_mutations_share_the_implicit_transaction() {
        let mut graph = Graph::new("g");
        let log = EventLog::attach(&mut graph);
        graph.subscribe_reentrant(|graph, event| {
            if let GraphEvent::AddNode(node) = event {
                if node.id == "A" {
                    graph.add_node("A-shadow", "Shadow", None);
                }
            }
        });

        graph.add_node("A", "Comp", None);

        assert_eq!(graph.nodes().len(), 2);
        assert!(!graph.transaction().is_open());
        assert_eq!(
            log.names(),
            ["startTransaction", "addNode", "addNode", "endTransaction"]
        );
    }

    #[test]
    fn unsubscribe_during_delivery() {
        let mut graph = Graph::new("g");
        let log = EventLog::attach(&mut graph);
        let id = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&id);
        let sub = graph.subscribe_reentrant(move |graph, _| {
            if let Some(me) = slot.borrow_mut().take() {
                graph.unsubscribe(me);
            }
        });
        *id.borrow_mut() = Some(sub);
        graph.add_node("A", "Comp", None);
        assert_eq!(graph.sink_mut().len(), 1);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn unsubscribe_during_delivery_reports_only_live_ids() {
        let mut graph = Graph::new("g");
        let gone = graph.subscribe(|_| {});
        assert!(graph.unsubscribe(gone));
        let other = graph.subscribe(|_| {});

        let seen = Rc::new(RefCell::new(Vec::new()));
        let record = Rc::clone(&seen);
        graph.subscribe_reentrant(move |graph, event| {
            if let GraphEvent::AddNode(_) = event {
                let sink = graph.sink_mut();
                let before = sink.len();
                let first = sink.unsubscribe(other);
                let again = sink.unsubscribe(other);
                let stale = sink.unsubscribe(gone);
                record.borrow_mut().push((before, first, again, stale, sink.len()));
            }
        });

        graph.add_node("A", "Comp", None);
        assert_eq!(*seen.borrow(), [(2, true, false, false, 1)]);
        assert_eq!(graph.sink_mut().len(), 1);
    }
}
