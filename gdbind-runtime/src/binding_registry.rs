// Binding registry: the process-wide table behind every wrapper's stable
// self-reference.
//
// Two maps:
// 1. Slots: binding id -> wrapper instance (strong for non-refcounted
//    wrappers, weak for refcounted ones)
// 2. Links: native handle -> binding id (at most one per live handle)
//
// Binding ids come from a monotonic counter and are never reused, so a freed
// binding can never be mistaken for a live one.
//
// Lock discipline: no `Arc` to an instance is ever dropped while the table
// lock is held. Dropping the last `Arc` runs finalization, which re-enters
// this module. Functions that remove slots hand them back to the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use gdbind_ffi::{BindingHandle, ObjectHandle};

use crate::error::{GdError, GdResult};
use crate::gd::ErasedInstance;
use crate::lock_or_recover;

/// A registry entry. Kept opaque; dropping it may finalize the instance.
pub(crate) enum Slot {
    Strong(Arc<dyn ErasedInstance>),
    Weak(Weak<dyn ErasedInstance>),
}

impl Slot {
    fn upgrade(&self) -> Option<Arc<dyn ErasedInstance>> {
        match self {
            Slot::Strong(arc) => Some(arc.clone()),
            Slot::Weak(weak) => weak.upgrade(),
        }
    }
}

#[derive(Default)]
struct BindingTable {
    slots: HashMap<u64, Slot>,
    links: HashMap<u64, u64>,
}

static NEXT_BINDING: AtomicU64 = AtomicU64::new(1);
static TABLE: OnceLock<Mutex<BindingTable>> = OnceLock::new();

fn table() -> &'static Mutex<BindingTable> {
    TABLE.get_or_init(|| Mutex::new(BindingTable::default()))
}

/// Reserve a fresh binding id.
pub(crate) fn next_binding() -> BindingHandle {
    BindingHandle(NEXT_BINDING.fetch_add(1, Ordering::Relaxed))
}

/// Allocate the self-reference slot for `instance`. Refcounted wrappers are
/// held weakly so dropping the last `Gd` finalizes them; everything else is
/// held strongly until disposed.
pub(crate) fn insert(binding: BindingHandle, instance: &Arc<dyn ErasedInstance>, strong: bool) {
    let slot = if strong {
        Slot::Strong(instance.clone())
    } else {
        Slot::Weak(Arc::downgrade(instance))
    };
    lock_or_recover(table()).slots.insert(binding.0, slot);
}

/// Link a native handle to a binding. Fails if another live binding already
/// shadows the handle.
pub(crate) fn link_handle(handle: ObjectHandle, binding: BindingHandle) -> GdResult<()> {
    if handle.is_null() {
        return Err(GdError::NullHandle);
    }
    let mut table = lock_or_recover(table());
    if let Some(existing) = table.links.get(&handle.to_addr()).copied() {
        if existing != binding.0 && table.slots.contains_key(&existing) {
            return Err(GdError::AlreadyBound);
        }
    }
    table.links.insert(handle.to_addr(), binding.0);
    Ok(())
}

/// Free a binding and its handle link. The returned slot must be dropped by
/// the caller after this function returns.
#[must_use]
pub(crate) fn release(binding: BindingHandle, handle: ObjectHandle) -> Option<Slot> {
    let mut table = lock_or_recover(table());
    if !handle.is_null() && table.links.get(&handle.to_addr()) == Some(&binding.0) {
        table.links.remove(&handle.to_addr());
    }
    table.slots.remove(&binding.0)
}

/// Find the live wrapper shadowing `handle`.
pub(crate) fn lookup(handle: ObjectHandle) -> Option<Arc<dyn ErasedInstance>> {
    if handle.is_null() {
        return None;
    }
    let table = lock_or_recover(table());
    let binding = table.links.get(&handle.to_addr())?;
    table.slots.get(binding)?.upgrade()
}

/// Find the live wrapper owning `binding`.
pub(crate) fn lookup_binding(binding: BindingHandle) -> Option<Arc<dyn ErasedInstance>> {
    lock_or_recover(table()).slots.get(&binding.0)?.upgrade()
}

/// Whether the self-reference for `binding` is still allocated.
pub fn is_allocated(binding: BindingHandle) -> bool {
    !binding.is_null() && lock_or_recover(table()).slots.contains_key(&binding.0)
}

/// Number of allocated bindings.
pub fn live_count() -> usize {
    lock_or_recover(table()).slots.len()
}

/// Drop every binding. Called during shutdown before library unload.
///
/// Strongly held wrappers that were never disposed are finalized here.
pub fn clear_all() {
    let drained: Vec<Slot> = {
        let mut table = lock_or_recover(table());
        table.links.clear();
        table.slots.drain().map(|(_, slot)| slot).collect()
    };
    drop(drained);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gd::{Gd, GdObject};
    use crate::mock_engine;
    use crate::traits::{GodotClass, ObjectHooks};

    struct Plain;
    impl ObjectHooks for Plain {}
    impl GodotClass for Plain {
        const CLASS_NAME: &'static str = "RegistryTestPlain";
    }

    fn spawn() -> Gd<Plain> {
        mock_engine::install();
        mock_engine::declare_class(Plain::CLASS_NAME, false);
        Gd::new(Plain).unwrap()
    }

    #[test]
    fn bindings_are_never_reused() {
        let a = next_binding();
        let b = next_binding();
        assert!(!a.is_null());
        assert!(b > a);
        assert!(!is_allocated(BindingHandle::NULL));
    }

    #[test]
    fn one_live_binding_per_handle() {
        let gd = spawn();
        let intruder = next_binding();
        assert_eq!(link_handle(gd.handle(), intruder), Err(GdError::AlreadyBound));
        assert_eq!(link_handle(ObjectHandle::null(), intruder), Err(GdError::NullHandle));

        let found = GdObject::from_binding(gd.binding()).unwrap();
        assert_eq!(found, gd);
        gd.dispose();
    }

    #[test]
    fn release_frees_binding_and_link() {
        let gd = spawn();
        let handle = gd.handle();
        let binding = gd.binding();
        assert!(is_allocated(binding));
        assert!(live_count() >= 1);

        gd.dispose();
        assert!(!is_allocated(binding));
        assert!(lookup(handle).is_none());
        assert!(GdObject::from_binding(binding).is_none());

        // The handle is free for a new wrapper now.
        let again = Gd::<Plain>::from_native(handle, || Plain).unwrap();
        assert_ne!(again.binding(), binding);
        again.dispose();
    }
}
