//! Recent-tab cycling gesture.
//!
//! The first step freezes a snapshot of the MRU stack and highlights the
//! entry after the current tab. Further steps move the highlight around the
//! snapshot. Releasing the held modifier commits the highlighted tab, which
//! is the only point where the live stack changes.

use crate::mru::MruStack;
use crate::tabs::TabId;
use quill_keybindings::Modifier;

/// Direction of a cycle step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

impl CycleDirection {
    fn offset(self) -> isize {
        match self {
            CycleDirection::Forward => 1,
            CycleDirection::Backward => -1,
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveCycle {
    snapshot: Vec<TabId>,
    cursor: usize,
    held: Option<Modifier>,
}

/// Cycle session state machine: inactive, or active over a snapshot.
#[derive(Debug, Default)]
pub struct TabCycler {
    active: Option<ActiveCycle>,
}

impl TabCycler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Advance the highlight and return the highlighted tab.
    ///
    /// While inactive this starts a session over `mru`. The tab on screen
    /// (the first open entry) always stays at index 0; only the entries after
    /// it are filtered by `is_eligible`. With no eligible tab to switch to
    /// nothing happens and `None` is returned. Entries for which `is_open` is
    /// false are pruned at every step and a closed highlight is skipped over.
    pub fn step(
        &mut self,
        direction: CycleDirection,
        held: Option<Modifier>,
        mru: &MruStack,
        is_open: impl Fn(TabId) -> bool,
        is_eligible: impl Fn(TabId) -> bool,
    ) -> Option<TabId> {
        if self.active.is_none() {
            let mut open = mru.snapshot().into_iter().filter(|&id| is_open(id));
            let current = open.next();
            let snapshot: Vec<TabId> = current
                .into_iter()
                .chain(open.filter(|&id| is_eligible(id)))
                .collect();
            if snapshot.len() <= 1 {
                log::debug!("Tab cycle ignored: {} eligible tab(s)", snapshot.len());
                return None;
            }
            let cursor = match direction {
                CycleDirection::Forward => 1,
                CycleDirection::Backward => snapshot.len() - 1,
            };
            let highlighted = snapshot[cursor];
            log::debug!("Tab cycle started over {:?}, cursor {}", snapshot, cursor);
            self.active = Some(ActiveCycle {
                snapshot,
                cursor,
                held,
            });
            return Some(highlighted);
        }

        let cycle = self.active.as_mut()?;
        let highlighted = cycle.snapshot.get(cycle.cursor).copied();
        let closed_before = cycle.snapshot[..cycle.cursor.min(cycle.snapshot.len())]
            .iter()
            .filter(|&&id| !is_open(id))
            .count();
        cycle.snapshot.retain(|&id| is_open(id));

        if cycle.snapshot.is_empty() {
            log::debug!("Tab cycle ended: every snapshot entry was closed");
            self.active = None;
            return None;
        }

        let len = cycle.snapshot.len() as isize;
        // Now indexes the highlighted entry, or the one that followed it
        let cursor = (cycle.cursor - closed_before) as isize;
        let next = if highlighted.is_some_and(&is_open) {
            cursor + direction.offset()
        } else {
            match direction {
                CycleDirection::Forward => cursor,
                CycleDirection::Backward => cursor - 1,
            }
        };
        cycle.cursor = next.rem_euclid(len) as usize;
        log::trace!("Tab cycle cursor -> {}", cycle.cursor);
        Some(cycle.snapshot[cycle.cursor])
    }

    /// End the session, touching the highlighted tab on `mru`.
    ///
    /// A highlight that has since closed is skipped in favour of the next
    /// open entry. Returns the committed tab.
    pub fn commit(&mut self, mru: &mut MruStack, is_open: impl Fn(TabId) -> bool) -> Option<TabId> {
        let cycle = self.active.take()?;
        let len = cycle.snapshot.len();
        let target = (0..len)
            .map(|offset| cycle.snapshot[(cycle.cursor + offset) % len])
            .find(|&id| is_open(id));

        match target {
            Some(id) => {
                log::debug!("Tab cycle committed tab {}", id);
                mru.touch(id);
            }
            None => log::debug!("Tab cycle ended without an open tab to commit"),
        }
        target
    }

    /// End the session without changing the stack. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.active.take().is_some();
        if was_active {
            log::debug!("Tab cycle cancelled");
        }
        was_active
    }

    pub fn highlighted(&self) -> Option<TabId> {
        let cycle = self.active.as_ref()?;
        cycle.snapshot.get(cycle.cursor).copied()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.active.as_ref().map(|c| c.cursor)
    }

    pub fn snapshot(&self) -> Option<&[TabId]> {
        self.active.as_ref().map(|c| c.snapshot.as_slice())
    }

    /// Modifier whose release commits the session.
    pub fn held_modifier(&self) -> Option<Modifier> {
        self.active.as_ref().and_then(|c| c.held)
    }
}
