//! Identifiers for numbered style slots in the gnuplot session
//!
//! gnuplot keeps line styles in its own process, addressed by small integers. An
//! [`Identifier`] is a cheaply clonable handle to one such slot; the [`IdAllocator`]
//! only holds weak references, so a slot becomes free as soon as the last handle
//! is dropped. A handle may carry an on-release statement (for example
//! `unset style line 50`) that is queued when the slot is freed; the session writes
//! queued statements at its next synchronization point.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

/// Smallest identifier handed out by default
pub const DEFAULT_ID_BASE: usize = 50;

type ReleaseQueue = RefCell<Vec<String>>;

struct Slot {
    value: usize,
    on_release: RefCell<Option<String>>,
    queue: Weak<ReleaseQueue>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        if let Some(statement) = self.on_release.get_mut().take() {
            if let Some(queue) = self.queue.upgrade() {
                queue.borrow_mut().push(statement);
            }
        }
    }
}

/// Handle to a live style slot
///
/// Clones share the slot. The slot stays reserved while any clone exists.
#[derive(Clone)]
pub struct Identifier(Rc<Slot>);

impl Identifier {
    /// The integer gnuplot knows this slot by
    pub fn value(&self) -> usize {
        self.0.value
    }

    /// Register the statement to emit once the last handle is dropped
    pub fn set_on_release(&self, statement: impl Into<String>) {
        *self.0.on_release.borrow_mut() = Some(statement.into());
    }

    /// Drop any registered on-release statement
    pub fn clear_on_release(&self) {
        self.0.on_release.borrow_mut().take();
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identifier")
            .field("value", &self.0.value)
            .field("on_release", &self.0.on_release.borrow())
            .finish()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Allocator for session-unique identifiers
#[derive(Debug)]
pub struct IdAllocator {
    base: usize,
    slots: BTreeMap<usize, Weak<Slot>>,
    released: Rc<ReleaseQueue>,
}

impl IdAllocator {
    /// Create an allocator handing out identifiers starting at `base`
    pub fn new(base: usize) -> Self {
        Self {
            base,
            slots: BTreeMap::new(),
            released: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// First identifier this allocator may hand out
    pub fn base(&self) -> usize {
        self.base
    }

    /// Allocate the smallest free identifier
    ///
    /// Expired slots are swept first, so identifiers released since the last call
    /// are immediately reusable.
    pub fn allocate(&mut self) -> Identifier {
        self.sweep();

        let mut value = self.base;
        for &taken in self.slots.keys() {
            if taken == value {
                value += 1;
            } else if taken > value {
                break;
            }
        }

        let slot = Rc::new(Slot {
            value,
            on_release: RefCell::new(None),
            queue: Rc::downgrade(&self.released),
        });
        self.slots.insert(value, Rc::downgrade(&slot));
        debug!(id = value, live = self.slots.len(), "Allocated identifier");
        Identifier(slot)
    }

    /// Remove map entries whose identifiers have no handles left
    pub fn sweep(&mut self) {
        self.slots.retain(|_, slot| slot.strong_count() > 0);
    }

    /// Number of identifiers that still have live handles
    pub fn live_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }

    /// Returns true if `value` is held by a live identifier
    pub fn is_live(&self, value: usize) -> bool {
        self.slots
            .get(&value)
            .is_some_and(|slot| slot.strong_count() > 0)
    }

    /// Values held by live identifiers, ascending
    pub fn live_values(&self) -> Vec<usize> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.strong_count() > 0)
            .map(|(&value, _)| value)
            .collect()
    }

    /// Take the on-release statements queued since the last drain, in release order
    pub fn drain_released(&self) -> Vec<String> {
        std::mem::take(&mut *self.released.borrow_mut())
    }

    /// Returns true if released statements are waiting to be drained
    pub fn has_released(&self) -> bool {
        !self.released.borrow().is_empty()
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_BASE)
    }
}
