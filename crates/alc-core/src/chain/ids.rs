//! Node identifier generation.

use super::node::NodeId;

/// Source of fresh node identifiers.
pub trait IdGenerator {
    /// Returns an id that has not been handed out before.
    fn next_id(&mut self) -> NodeId;

    /// Records an id that entered the chain from elsewhere (a loaded document
    /// or an externally built node) so it is never handed out.
    fn observe(&mut self, id: NodeId);
}

/// Monotonic counter starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    /// Starts counting at 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Starts counting right above `max`.
    pub fn after(max: Option<NodeId>) -> Self {
        let mut ids = Self::new();
        if let Some(max) = max {
            ids.observe(max);
        }
        ids
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    fn observe(&mut self, id: NodeId) {
        self.next = self.next.max(id.index().saturating_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_from_one() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_id(), NodeId(1));
        assert_eq!(ids.next_id(), NodeId(2));
    }

    #[test]
    fn resumes_above_observed() {
        let mut ids = SequentialIds::after(Some(NodeId(41)));
        assert_eq!(ids.next_id(), NodeId(42));
        ids.observe(NodeId(10));
        assert_eq!(ids.next_id(), NodeId(43));
        ids.observe(NodeId(100));
        assert_eq!(ids.next_id(), NodeId(101));
    }
}
