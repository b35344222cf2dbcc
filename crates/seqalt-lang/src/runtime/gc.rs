//! Heap registry and mark/sweep collector.
//!
//! Composites are owned by `Rc` handles, so most garbage disappears as soon as
//! its last handle is dropped. Reference cycles (a closure stored in the scope
//! it captured, an environment holding itself) never reach a zero count; the
//! collector finds them by marking everything reachable from the caller's
//! roots and clearing the payload of every other registered composite, which
//! drops the cycle's internal handles and lets `Rc` unwind it.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::value::{Composite, Value};

// ─── Objects ─────────────────────────────────────────────────────────────────

/// A heap cell: the mutable payload plus the collector's mark bit.
pub struct Object {
    body: RefCell<Composite>,
    marked: Cell<bool>,
}

/// Tears nested composites down with a work list. Children held by no one
/// else have their payload taken here, so the default drop glue never
/// recurses more than one level.
impl Drop for Object {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_children(self.body.get_mut(), &mut pending);

        while let Some(child) = pending.pop() {
            if Rc::strong_count(&child.0) == 1 {
                if let Ok(mut body) = child.0.body.try_borrow_mut() {
                    take_children(&mut body, &mut pending);
                }
            }
        }
    }
}

fn take_children(body: &mut Composite, pending: &mut Vec<Gc>) {
    let values: Vec<Value> = match body {
        Composite::Str(_) => return,
        Composite::Array(items) => std::mem::take(items),
        Composite::Dict(entries) => std::mem::take(entries).into_values().collect(),
    };
    pending.extend(values.into_iter().filter_map(|v| match v {
        Value::Ref(gc) => Some(gc),
        _ => None,
    }));
}

/// Counted handle to a registered composite.
#[derive(Clone)]
pub struct Gc(Rc<Object>);

impl Gc {
    pub fn borrow(&self) -> Ref<'_, Composite> {
        self.0.body.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Composite> {
        self.0.body.borrow_mut()
    }

    /// Identity comparison: two handles to the same composite.
    pub fn ptr_eq(&self, other: &Gc) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn as_ptr(&self) -> *const Object {
        Rc::as_ptr(&self.0)
    }
}

impl fmt::Debug for Gc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gc({:p})", self.as_ptr())
    }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Registry entries before the sweep (including already-expired ones).
    pub registered_before: usize,
    /// Live but unmarked composites whose payload was cleared.
    pub cleared: usize,
    /// Registry entries dropped because their composite is gone.
    pub released: usize,
    pub registered_after: usize,
}

// ─── Heap ────────────────────────────────────────────────────────────────────

/// Registry of every composite allocated in one interpreter session.
///
/// Entries are `Weak`, so being registered never keeps a composite alive.
#[derive(Default)]
pub struct Heap {
    objects: RefCell<Vec<Weak<Object>>>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate and register a composite.
    pub fn alloc(&self, body: Composite) -> Gc {
        let object = Rc::new(Object { body: RefCell::new(body), marked: Cell::new(false) });
        self.objects.borrow_mut().push(Rc::downgrade(&object));
        Gc(object)
    }

    /// Registry size, counting entries whose composite has already been freed
    /// but not yet pruned by a sweep.
    pub fn len(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.borrow().is_empty()
    }

    /// Registered composites that are still alive.
    pub fn live(&self) -> usize {
        self.objects.borrow().iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Mark every composite reachable from `root`.
    pub fn mark(&self, root: &Value) {
        let mut pending: Vec<Gc> = root.as_gc().into_iter().cloned().collect();

        while let Some(gc) = pending.pop() {
            if gc.0.marked.replace(true) {
                continue;
            }
            match &*gc.borrow() {
                Composite::Str(_) => {}
                Composite::Array(items) => {
                    pending.extend(items.iter().filter_map(Value::as_gc).cloned());
                }
                Composite::Dict(entries) => {
                    pending.extend(entries.values().filter_map(Value::as_gc).cloned());
                }
            }
        }
    }

    /// Clear every live, unmarked composite, reset all marks and prune
    /// expired registry entries.
    ///
    /// Only sound when nothing outside the marked set will be used again.
    pub fn sweep(&self) -> GcStats {
        let snapshot: Vec<Weak<Object>> = self.objects.borrow().clone();
        let registered_before = snapshot.len();
        let mut cleared = 0;

        for weak in &snapshot {
            let Some(object) = weak.upgrade() else { continue };
            if !object.marked.get() {
                // The old payload is dropped after the borrow is released.
                let old = object.body.replace(Composite::Array(Vec::new()));
                drop(old);
                cleared += 1;
            }
        }

        for weak in &snapshot {
            if let Some(object) = weak.upgrade() {
                object.marked.set(false);
            }
        }
        drop(snapshot);

        let mut objects = self.objects.borrow_mut();
        objects.retain(|w| w.strong_count() > 0);
        let stats = GcStats {
            registered_before,
            cleared,
            released: registered_before - objects.len(),
            registered_after: objects.len(),
        };
        debug!(
            before = stats.registered_before,
            cleared = stats.cleared,
            released = stats.released,
            after = stats.registered_after,
            "gc sweep"
        );
        stats
    }

    /// Mark from each root, then sweep.
    pub fn collect<'a>(&self, roots: impl IntoIterator<Item = &'a Value>) -> GcStats {
        for root in roots {
            self.mark(root);
        }
        self.sweep()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap").field("registered", &self.len()).field("live", &self.live()).finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
