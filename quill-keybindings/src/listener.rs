//! Key listener lifetimes.
//!
//! The dispatcher and the binding recorder each attach a key listener for as
//! long as they are live. A listener is a [`ListenerGuard`]: attaching returns
//! the guard and dropping it detaches, so no listener outlives its owner.
//! [`ListenerStats`] keeps the attach/detach counts for inspection.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Which subsystem owns a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// The global command dispatcher
    Dispatcher,
    /// The binding recorder, which shadows the dispatcher while recording
    Recorder,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    active: usize,
    attached: usize,
    detached: usize,
}

/// Shared attach/detach bookkeeping. Clones observe the same counters.
#[derive(Debug, Clone, Default)]
pub struct ListenerStats {
    counts: Rc<RefCell<HashMap<ListenerKind, Counts>>>,
}

impl ListenerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener of `kind`; it stays attached until the guard is dropped.
    pub fn attach(&self, kind: ListenerKind) -> ListenerGuard {
        {
            let mut counts = self.counts.borrow_mut();
            let entry = counts.entry(kind).or_default();
            entry.active += 1;
            entry.attached += 1;
        }
        log::trace!("Attached {:?} key listener", kind);
        ListenerGuard {
            kind,
            counts: Rc::clone(&self.counts),
        }
    }

    /// Listeners of `kind` currently attached.
    pub fn active(&self, kind: ListenerKind) -> usize {
        self.get(kind).active
    }

    /// Total attaches of `kind` so far.
    pub fn attach_count(&self, kind: ListenerKind) -> usize {
        self.get(kind).attached
    }

    /// Total detaches of `kind` so far.
    pub fn detach_count(&self, kind: ListenerKind) -> usize {
        self.get(kind).detached
    }

    fn get(&self, kind: ListenerKind) -> Counts {
        self.counts.borrow().get(&kind).copied().unwrap_or_default()
    }
}

/// An attached key listener. Dropping it detaches the listener.
#[derive(Debug)]
pub struct ListenerGuard {
    kind: ListenerKind,
    counts: Rc<RefCell<HashMap<ListenerKind, Counts>>>,
}

impl ListenerGuard {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let mut counts = self.counts.borrow_mut();
        let entry = counts.entry(self.kind).or_default();
        entry.active = entry.active.saturating_sub(1);
        entry.detached += 1;
        log::trace!("Detached {:?} key listener", self.kind);
    }
}
