//! Generation counter tying in-flight responses to the view that issued them.

use std::{cell::Cell, rc::Rc};

#[derive(Debug, Clone, Default)]
/// Shared generation counter; clones observe the same generation.
pub struct SessionLifetime {
    generation: Rc<Cell<u64>>,
}

impl SessionLifetime {
    /// Captures the current generation.
    pub fn ticket(&self) -> LifetimeTicket {
        LifetimeTicket {
            generation: self.generation.clone(),
            issued: self.generation.get(),
        }
    }

    /// Moves to a new generation; every outstanding ticket goes stale.
    pub fn invalidate(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}

#[derive(Debug, Clone)]
/// Proof that work started under a given generation.
pub struct LifetimeTicket {
    generation: Rc<Cell<u64>>,
    issued: u64,
}

impl LifetimeTicket {
    /// Returns `true` while no invalidation happened since the ticket was issued.
    pub fn is_current(&self) -> bool {
        self.generation.get() == self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_stales_outstanding_tickets() {
        let lifetime = SessionLifetime::default();
        let first = lifetime.ticket();
        assert!(first.is_current());

        lifetime.clone().invalidate();
        assert!(!first.is_current());
        assert!(lifetime.ticket().is_current());
    }
}
