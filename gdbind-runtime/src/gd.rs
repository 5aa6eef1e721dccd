// Gd<T>: the Rust wrapper shadowing one engine object.
//
// A wrapper owns the pair {stable self-reference (binding), native handle}.
// Explicit `dispose()` and finalization (last `Gd` dropped) both funnel into
// `Base::teardown`, which is guarded by a monotonic disposed flag: the first
// caller wins, every later call is a no-op. That flag is what keeps the
// native reference count balanced at exactly one acquire and one release.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use gdbind_ffi::{BindingHandle, ObjectHandle};

use crate::binding_registry;
use crate::class_registry;
use crate::error::{check_ffi, GdError, GdResult};
use crate::ffi_dispatch;
use crate::ffi_guard::guard_hook;
use crate::lock_or_recover;
use crate::logging::{log_message, LOG_WARNING};
use crate::property::PropertyInfo;
use crate::string_name::StringName;
use crate::traits::{GodotClass, ObjectHooks};

// ---------------------------------------------------------------------------
// Base: lifecycle fields shared by every wrapper
// ---------------------------------------------------------------------------

/// Descriptor storage that must outlive a single native call.
#[derive(Default)]
pub(crate) struct PropertyCache {
    /// Value most recently returned by `property_count`.
    pub last_count: Option<usize>,
    /// Descriptors from the last `get_property_list`; the engine holds
    /// pointers into these strings until the next list call.
    pub listed: Vec<PropertyInfo>,
    /// Descriptors rewritten by `validate_property`, keyed by property name.
    pub validated: HashMap<StringName, PropertyInfo>,
}

pub struct Base {
    binding: BindingHandle,
    handle: AtomicU64,
    disposed: AtomicBool,
    acquired: AtomicBool,
    /// Set when teardown ran while the user state was borrowed; `on_dispose`
    /// still owes a call once the borrow ends.
    pending_dispose: AtomicBool,
    refcounted: bool,
    class_name: &'static str,
    pub(crate) cache: Mutex<PropertyCache>,
}

impl Base {
    fn new(binding: BindingHandle, class_name: &'static str, refcounted: bool) -> Self {
        Base {
            binding,
            handle: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            acquired: AtomicBool::new(false),
            pending_dispose: AtomicBool::new(false),
            refcounted,
            class_name,
            cache: Mutex::new(PropertyCache::default()),
        }
    }

    #[inline]
    pub fn binding(&self) -> BindingHandle {
        self.binding
    }

    /// Current native handle. Null once disposed.
    #[inline]
    pub fn handle(&self) -> ObjectHandle {
        ObjectHandle::from_addr(self.handle.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_refcounted(&self) -> bool {
        self.refcounted
    }

    #[inline]
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    /// Store the handle and link it in the registry. With `acquire`, also
    /// take one native reference (refcounted classes only).
    fn bind(&self, handle: ObjectHandle, acquire: bool) -> GdResult<()> {
        binding_registry::link_handle(handle, self.binding)?;
        self.handle.store(handle.to_addr(), Ordering::Release);
        if acquire && self.refcounted {
            // SAFETY: API is initialized (we just got a handle from it) and
            // the handle is non-null.
            if unsafe { ffi_dispatch::refcount_reference(handle) } {
                self.acquired.store(true, Ordering::Release);
            } else {
                log_message(
                    LOG_WARNING,
                    &format!(
                        "[gdbind] {} is declared refcounted but its native object is not",
                        self.class_name
                    ),
                );
            }
        }
        Ok(())
    }

    /// Mark a wrapper whose construction failed so finalization skips it.
    fn abandon(&self) -> Option<binding_registry::Slot> {
        self.disposed.store(true, Ordering::Release);
        binding_registry::release(self.binding, self.handle())
    }

    /// The single teardown routine. Idempotent: only the first caller runs it.
    ///
    /// Order: disposed flag, user hook (isolated), native release, binding
    /// release, handle cleared.
    /// A hook that cannot run because the user state is borrowed is deferred
    /// through `pending_dispose` by the caller.
    fn teardown(&self, finalizing: bool, hook: impl FnOnce(bool)) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        guard_hook("on_dispose", self.class_name, (), || hook(finalizing));

        let handle = self.handle();
        if self.acquired.swap(false, Ordering::AcqRel) && !handle.is_null() {
            // SAFETY: handle was acquired in `bind`, so the API is initialized.
            unsafe {
                ffi_dispatch::refcount_unreference(handle);
            }
        }

        let released = binding_registry::release(self.binding, handle);
        self.handle.store(0, Ordering::Release);
        *lock_or_recover(&self.cache) = PropertyCache::default();

        // Dropped last, outside every lock.
        drop(released);
    }
}

// ---------------------------------------------------------------------------
// Instance<T> + type erasure
// ---------------------------------------------------------------------------

pub(crate) struct Instance<T: GodotClass> {
    base: Base,
    user: Mutex<T>,
}

/// Object-safe view of an `Instance<T>`, stored in the binding registry.
pub(crate) trait ErasedInstance: Send + Sync + 'static {
    fn base(&self) -> &Base;
    /// Run `f` against the user hooks. Skipped (with a warning) on re-entrant access.
    fn hooks_dyn(&self, f: &mut dyn FnMut(&mut dyn ObjectHooks));
    fn dispose(&self);
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: GodotClass> Instance<T> {
    /// Run an `on_dispose` deferred by a dispose that found the state borrowed.
    fn run_pending_dispose(&self, user: &mut T) {
        if self.base.pending_dispose.swap(false, Ordering::AcqRel) {
            guard_hook("on_dispose", self.base.class_name, (), || user.on_dispose(false));
        }
    }

    fn try_user(&self) -> Option<MutexGuard<'_, T>> {
        match self.user.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => {
                log_message(
                    LOG_WARNING,
                    &format!(
                        "[gdbind] re-entrant call into {} skipped",
                        self.base.class_name
                    ),
                );
                None
            }
        }
    }
}

impl<T: GodotClass> ErasedInstance for Instance<T> {
    fn base(&self) -> &Base {
        &self.base
    }

    fn hooks_dyn(&self, f: &mut dyn FnMut(&mut dyn ObjectHooks)) {
        if let Some(mut user) = self.try_user() {
            f(&mut *user);
            self.run_pending_dispose(&mut *user);
        }
    }

    fn dispose(&self) {
        match self.user.try_lock() {
            Ok(mut user) => self.base.teardown(false, |finalizing| user.on_dispose(finalizing)),
            Err(TryLockError::Poisoned(poisoned)) => {
                let mut user = poisoned.into_inner();
                self.base.teardown(false, |finalizing| user.on_dispose(finalizing));
            }
            // Disposed from inside one of its own hooks (or while bound
            // elsewhere): the hook runs when that borrow is released.
            Err(TryLockError::WouldBlock) => self.base.teardown(false, |_| {
                self.base.pending_dispose.store(true, Ordering::Release);
            }),
        }
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl<T: GodotClass> Drop for Instance<T> {
    fn drop(&mut self) {
        // Finalization path. A no-op if `dispose()` already ran.
        let user = self.user.get_mut().unwrap_or_else(PoisonError::into_inner);
        if self.base.pending_dispose.swap(false, Ordering::AcqRel) {
            guard_hook("on_dispose", self.base.class_name, (), || user.on_dispose(false));
        }
        self.base.teardown(true, |finalizing| user.on_dispose(finalizing));
    }
}

/// Run `f` against the hooks of an erased instance. `None` if the call was
/// skipped because the instance is already borrowed.
pub(crate) fn with_hooks<R>(
    instance: &dyn ErasedInstance,
    f: impl FnOnce(&mut dyn ObjectHooks) -> R,
) -> Option<R> {
    let mut f = Some(f);
    let mut out = None;
    instance.hooks_dyn(&mut |hooks| {
        if let Some(f) = f.take() {
            out = Some(f(hooks));
        }
    });
    out
}

// ---------------------------------------------------------------------------
// Gd<T>
// ---------------------------------------------------------------------------

/// A typed, shared wrapper around one engine object.
///
/// - Clone shares the same wrapper; there is at most one wrapper per handle.
/// - Equality and hashing use the native handle value only. A disposed
///   wrapper has a null handle and compares equal to every other disposed
///   wrapper. Do not keep a `Gd` in a hashed collection across `dispose()`.
/// - Refcounted classes are finalized when the last `Gd` is dropped.
///   Other classes live until [`dispose`](Self::dispose) or until the engine
///   frees the native object.
pub struct Gd<T: GodotClass> {
    inner: Arc<Instance<T>>,
}

impl<T: GodotClass> Gd<T> {
    fn alloc(value: T, strong: bool) -> Self {
        let binding = binding_registry::next_binding();
        let inner = Arc::new(Instance {
            base: Base::new(binding, T::CLASS_NAME, T::REFCOUNTED),
            user: Mutex::new(value),
        });
        let erased: Arc<dyn ErasedInstance> = inner.clone();
        binding_registry::insert(binding, &erased, strong);
        Gd { inner }
    }

    fn attach(handle: ObjectHandle, init: impl FnOnce() -> T, engine_owned: bool) -> GdResult<Self> {
        if handle.is_null() {
            return Err(GdError::NullHandle);
        }
        if let Some(existing) = binding_registry::lookup(handle) {
            return GdObject { inner: existing }.cast::<T>();
        }
        let gd = Self::alloc(init(), engine_owned || !T::REFCOUNTED);
        let base = &gd.inner.base;
        if let Err(err) = base.bind(handle, !engine_owned) {
            drop(base.abandon());
            return Err(err);
        }
        Ok(gd)
    }

    /// Create a new engine object of class `T` and wrap it.
    ///
    /// Fails with `ClassNotFound` if the class database cannot resolve
    /// `T::CLASS_NAME` to a constructible native type.
    pub fn new(value: T) -> GdResult<Self> {
        let class = class_registry::resolve_constructible_type(T::CLASS_NAME)?;
        let gd = Self::alloc(value, !T::REFCOUNTED);
        let base = &gd.inner.base;

        // SAFETY: resolve succeeded, so the API is initialized.
        let handle = unsafe { ffi_dispatch::class_db_make_handle_for_managed(class, base.binding) };
        if handle.is_null() {
            drop(base.abandon());
            return Err(GdError::InvalidOperation(format!(
                "engine refused to create a native {}",
                T::CLASS_NAME
            )));
        }
        if let Err(err) = base.bind(handle, true) {
            drop(base.abandon());
            return Err(err);
        }
        Ok(gd)
    }

    /// Wrap an existing native object without creating a new one.
    ///
    /// If the handle already has a live wrapper of type `T`, that wrapper is
    /// returned and `init` is not called. A live wrapper of another type
    /// yields `InvalidCast`.
    pub fn from_native(handle: ObjectHandle, init: impl FnOnce() -> T) -> GdResult<Self> {
        Self::attach(handle, init, false)
    }

    /// Shadow a native object the engine created and owns.
    ///
    /// The wrapper takes no native reference and stays registered until the
    /// engine reports the object freed (or it is disposed).
    pub(crate) fn shadow(handle: ObjectHandle, init: impl FnOnce() -> T) -> GdResult<Self> {
        Self::attach(handle, init, true)
    }

    /// Native handle. Null once disposed.
    #[inline]
    pub fn handle(&self) -> ObjectHandle {
        self.inner.base.handle()
    }

    /// Stable self-reference handed to the engine.
    #[inline]
    pub fn binding(&self) -> BindingHandle {
        self.inner.base.binding()
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.inner.base.is_disposed()
    }

    /// True from construction until teardown completes; never true again after.
    pub fn is_instance_valid(&self) -> bool {
        binding_registry::is_allocated(self.binding()) && !self.handle().is_null()
    }

    /// Tear the wrapper down now. Idempotent.
    ///
    /// Runs [`ObjectHooks::on_dispose`] with `finalizing = false`, releases
    /// the native reference (refcounted classes), frees the binding, and
    /// clears the handle. Later finalization does nothing.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Borrow the Rust-side state.
    ///
    /// # Panics
    /// If the state is already borrowed (e.g. from inside one of its own hooks).
    pub fn bind(&self) -> MutexGuard<'_, T> {
        match self.inner.user.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                panic!("Gd<{}>::bind(): instance is already bound", T::CLASS_NAME)
            }
        }
    }

    /// Like [`bind`](Self::bind), but `None` (logged) instead of panicking
    /// when the state is already borrowed.
    pub fn try_bind(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_user()
    }

    /// Native reference count, or `None` for non-refcounted or disposed objects.
    pub fn reference_count(&self) -> Option<i64> {
        let handle = self.handle();
        if handle.is_null() || !T::REFCOUNTED {
            return None;
        }
        // SAFETY: a live handle implies an initialized API.
        let count = unsafe { ffi_dispatch::refcount_get_reference_count(handle) };
        (count >= 0).then_some(count)
    }

    /// Ask the engine for the object's native class name.
    pub fn native_class_name(&self) -> GdResult<String> {
        let handle = self.handle();
        if handle.is_null() {
            return Err(GdError::ObjectDisposed);
        }
        // Stack buffer; 256 bytes is enough for virtually all class names.
        let mut buf = [0u8; 256];
        let mut out_len: u32 = 0;
        // SAFETY: a live handle implies an initialized API; `buf` and
        // `out_len` outlive the call and `buf.len()` bounds the write.
        let code = unsafe {
            ffi_dispatch::core_get_class_name(handle, buf.as_mut_ptr(), buf.len() as u32, &mut out_len)
        };
        check_ffi(code)?;
        let len = (out_len as usize).min(buf.len());
        std::str::from_utf8(&buf[..len])
            .map(|s| s.to_owned())
            .map_err(|_| GdError::Internal("class name is not valid UTF-8".into()))
    }

    /// Type-erased wrapper sharing this instance.
    pub fn upcast(&self) -> GdObject {
        GdObject {
            inner: self.inner.clone(),
        }
    }
}

impl<T: GodotClass> Clone for Gd<T> {
    fn clone(&self) -> Self {
        Gd {
            inner: self.inner.clone(),
        }
    }
}

impl<T: GodotClass, U: GodotClass> PartialEq<Gd<U>> for Gd<T> {
    fn eq(&self, other: &Gd<U>) -> bool {
        self.handle() == other.handle()
    }
}

impl<T: GodotClass> Eq for Gd<T> {}

impl<T: GodotClass> PartialEq<ObjectHandle> for Gd<T> {
    fn eq(&self, other: &ObjectHandle) -> bool {
        self.handle() == *other
    }
}

impl<T: GodotClass> Hash for Gd<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle().hash(state);
    }
}

impl<T: GodotClass> fmt::Debug for Gd<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gd")
            .field("class", &T::CLASS_NAME)
            .field("handle", &self.handle())
            .field("binding", &self.binding())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Handle of an optional wrapper; `None` maps to the null handle.
pub fn handle_of<T: GodotClass>(obj: Option<&Gd<T>>) -> ObjectHandle {
    obj.map(Gd::handle).unwrap_or_default()
}

/// `None` and disposed wrappers are not valid instances.
pub fn is_instance_valid<T: GodotClass>(obj: Option<&Gd<T>>) -> bool {
    obj.is_some_and(Gd::is_instance_valid)
}

// ---------------------------------------------------------------------------
// GdObject: type-erased wrapper
// ---------------------------------------------------------------------------

/// A wrapper of unknown Rust class. Same identity rules as [`Gd<T>`].
#[derive(Clone)]
pub struct GdObject {
    inner: Arc<dyn ErasedInstance>,
}

impl GdObject {
    pub(crate) fn from_erased(inner: Arc<dyn ErasedInstance>) -> Self {
        GdObject { inner }
    }

    /// Live wrapper shadowing `handle`, if any.
    pub fn lookup(handle: ObjectHandle) -> Option<GdObject> {
        binding_registry::lookup(handle).map(GdObject::from_erased)
    }

    /// Live wrapper owning the self-reference `binding`, if any.
    pub fn from_binding(binding: BindingHandle) -> Option<GdObject> {
        binding_registry::lookup_binding(binding).map(GdObject::from_erased)
    }

    #[inline]
    pub fn handle(&self) -> ObjectHandle {
        self.inner.base().handle()
    }

    #[inline]
    pub fn binding(&self) -> BindingHandle {
        self.inner.base().binding()
    }

    #[inline]
    pub fn class_name(&self) -> &'static str {
        self.inner.base().class_name()
    }

    pub fn is_instance_valid(&self) -> bool {
        binding_registry::is_allocated(self.binding()) && !self.handle().is_null()
    }

    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Recover the typed wrapper.
    pub fn cast<T: GodotClass>(self) -> GdResult<Gd<T>> {
        self.inner
            .into_any()
            .downcast::<Instance<T>>()
            .map(|inner| Gd { inner })
            .map_err(|_| GdError::InvalidCast)
    }
}

impl PartialEq for GdObject {
    fn eq(&self, other: &Self) -> bool {
        self.handle() == other.handle()
    }
}

impl Eq for GdObject {}

impl<T: GodotClass> PartialEq<Gd<T>> for GdObject {
    fn eq(&self, other: &Gd<T>) -> bool {
        self.handle() == other.handle()
    }
}

impl Hash for GdObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle().hash(state);
    }
}

impl fmt::Debug for GdObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GdObject")
            .field("class", &self.class_name())
            .field("handle", &self.handle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_engine;
    use crate::variant::Variant;

    #[derive(Default)]
    struct Counter {
        hits: u32,
    }
    impl ObjectHooks for Counter {}
    impl GodotClass for Counter {
        const CLASS_NAME: &'static str = "GdTestCounter";
    }

    #[derive(Default)]
    struct Shared;
    impl ObjectHooks for Shared {}
    impl GodotClass for Shared {
        const CLASS_NAME: &'static str = "GdTestShared";
        const REFCOUNTED: bool = true;
    }

    struct Grumpy;
    impl ObjectHooks for Grumpy {
        fn on_dispose(&mut self, _finalizing: bool) {
            panic!("refusing to go quietly");
        }
    }
    impl GodotClass for Grumpy {
        const CLASS_NAME: &'static str = "GdTestGrumpy";
        const REFCOUNTED: bool = true;
    }

    struct Recorder {
        seen: Arc<Mutex<Vec<bool>>>,
    }
    impl ObjectHooks for Recorder {
        fn on_dispose(&mut self, finalizing: bool) {
            self.seen.lock().unwrap().push(finalizing);
        }
    }
    impl GodotClass for Recorder {
        const CLASS_NAME: &'static str = "GdTestRecorder";
        const REFCOUNTED: bool = true;
    }

    struct SelfFreeing {
        me: ObjectHandle,
        seen: Arc<Mutex<Vec<bool>>>,
    }
    impl ObjectHooks for SelfFreeing {
        fn call(&mut self, method: &StringName, _arg: &Variant, _ret: &mut Variant) {
            if method == "queue_free" {
                if let Some(me) = GdObject::lookup(self.me) {
                    me.dispose();
                }
            }
        }

        fn on_dispose(&mut self, finalizing: bool) {
            self.seen.lock().unwrap().push(finalizing);
        }
    }
    impl GodotClass for SelfFreeing {
        const CLASS_NAME: &'static str = "GdTestSelfFreeing";
    }

    fn setup() {
        mock_engine::install();
        mock_engine::declare_class(Counter::CLASS_NAME, false);
        mock_engine::declare_class(Shared::CLASS_NAME, true);
        mock_engine::declare_class(Grumpy::CLASS_NAME, true);
        mock_engine::declare_class(Recorder::CLASS_NAME, true);
        mock_engine::declare_class(SelfFreeing::CLASS_NAME, false);
    }

    #[test]
    fn refcounted_dispose_releases_exactly_once() {
        setup();
        let gd = Gd::new(Shared).unwrap();
        let handle = gd.handle();
        assert!(!handle.is_null());
        assert_eq!(gd.reference_count(), Some(1));

        gd.dispose();
        assert!(gd.handle().is_null());
        assert!(gd.is_disposed());
        assert_eq!(mock_engine::reference_count(handle), Some(0));

        gd.dispose();
        assert_eq!(mock_engine::reference_count(handle), Some(0));

        drop(gd);
        let native = mock_engine::object(handle).unwrap();
        assert_eq!(native.acquires, 1);
        assert_eq!(native.releases, 1);
    }

    #[test]
    fn last_drop_finalizes_refcounted_wrapper() {
        setup();
        let gd = Gd::new(Shared).unwrap();
        let handle = gd.handle();
        let other = gd.clone();

        drop(gd);
        assert_eq!(mock_engine::reference_count(handle), Some(1));
        assert!(other.is_instance_valid());

        drop(other);
        assert_eq!(mock_engine::reference_count(handle), Some(0));
        assert!(GdObject::lookup(handle).is_none());
    }

    #[test]
    fn non_refcounted_wrapper_survives_drop_until_disposed() {
        setup();
        let gd = Gd::new(Counter::default()).unwrap();
        let handle = gd.handle();
        assert_eq!(gd.reference_count(), None);
        drop(gd);

        let found = GdObject::lookup(handle).unwrap();
        assert!(found.is_instance_valid());
        found.dispose();
        assert!(GdObject::lookup(handle).is_none());
    }

    #[test]
    fn equality_follows_handles() {
        setup();
        let a = Gd::new(Counter::default()).unwrap();
        let b = a.clone();
        let c = Gd::new(Counter::default()).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a == a.handle());

        a.dispose();
        c.dispose();
        assert_eq!(a, c);
        assert!(a == ObjectHandle::null());
    }

    #[test]
    fn validity_never_comes_back() {
        setup();
        let gd = Gd::new(Counter::default()).unwrap();
        assert!(gd.is_instance_valid());
        assert!(is_instance_valid(Some(&gd)));

        gd.dispose();
        assert!(!gd.is_instance_valid());
        gd.dispose();
        assert!(!is_instance_valid(Some(&gd)));

        assert!(!is_instance_valid::<Counter>(None));
        assert!(handle_of::<Counter>(None).is_null());
    }

    #[test]
    fn panicking_dispose_hook_still_releases() {
        setup();
        let gd = Gd::new(Grumpy).unwrap();
        let handle = gd.handle();

        gd.dispose();
        assert!(gd.is_disposed());
        assert!(gd.handle().is_null());
        assert_eq!(mock_engine::reference_count(handle), Some(0));

        drop(gd);
        assert_eq!(mock_engine::object(handle).unwrap().releases, 1);
        assert!(!mock_engine::logs_containing("hook 'on_dispose' panicked on GdTestGrumpy").is_empty());
    }

    #[test]
    fn dispose_hook_sees_how_it_was_reached() {
        setup();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let explicit = Gd::new(Recorder { seen: seen.clone() }).unwrap();
        explicit.dispose();
        drop(explicit);
        assert_eq!(*seen.lock().unwrap(), vec![false]);

        let dropped = Gd::new(Recorder { seen: seen.clone() }).unwrap();
        drop(dropped);
        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn object_disposing_itself_from_a_hook_still_runs_on_dispose() {
        setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let gd = Gd::new(SelfFreeing { me: ObjectHandle::null(), seen: seen.clone() }).unwrap();
        let handle = gd.handle();
        gd.bind().me = handle;

        let mut ret = Variant::Nil;
        crate::dispatch::call(handle, &StringName::from("queue_free"), &Variant::Nil, &mut ret);
        assert!(gd.is_disposed());
        assert!(GdObject::lookup(handle).is_none());
        assert_eq!(*seen.lock().unwrap(), vec![false]);

        drop(gd);
        assert_eq!(*seen.lock().unwrap(), vec![false]);
    }

    #[test]
    fn dispose_while_bound_defers_the_hook() {
        setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let gd = Gd::new(Recorder { seen: seen.clone() }).unwrap();
        let handle = gd.handle();

        let guard = gd.bind();
        gd.dispose();
        assert_eq!(mock_engine::reference_count(handle), Some(0));
        assert!(seen.lock().unwrap().is_empty());
        drop(guard);

        drop(gd);
        assert_eq!(*seen.lock().unwrap(), vec![false]);
        assert_eq!(mock_engine::object(handle).unwrap().releases, 1);
    }

    #[test]
    fn from_native_reuses_live_wrapper() {
        setup();
        let handle = mock_engine::spawn_native(Counter::CLASS_NAME);
        let first = Gd::<Counter>::from_native(handle, Counter::default).unwrap();
        let second = Gd::<Counter>::from_native(handle, || unreachable!()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.binding(), second.binding());

        let wrong = Gd::<Shared>::from_native(handle, || Shared);
        assert_eq!(wrong.unwrap_err(), GdError::InvalidCast);

        assert_eq!(
            Gd::<Counter>::from_native(ObjectHandle::null(), Counter::default).unwrap_err(),
            GdError::NullHandle
        );
        first.dispose();
    }

    #[test]
    fn unknown_class_is_a_hard_error() {
        setup();
        struct Undeclared;
        impl ObjectHooks for Undeclared {}
        impl GodotClass for Undeclared {
            const CLASS_NAME: &'static str = "GdTestUndeclared";
        }
        let err = Gd::new(Undeclared).unwrap_err();
        assert_eq!(err, GdError::ClassNotFound("GdTestUndeclared".into()));
    }

    #[test]
    fn native_class_name_comes_from_engine() {
        setup();
        let gd = Gd::new(Counter::default()).unwrap();
        assert_eq!(gd.native_class_name().unwrap(), "GdTestCounter");
        gd.dispose();
        assert_eq!(gd.native_class_name().unwrap_err(), GdError::ObjectDisposed);
    }

    #[test]
    fn upcast_and_cast_share_the_instance() {
        setup();
        let gd = Gd::new(Counter::default()).unwrap();
        gd.bind().hits += 1;

        let obj = gd.upcast();
        assert_eq!(obj, gd);
        assert_eq!(obj.class_name(), "GdTestCounter");

        let back = GdObject::lookup(gd.handle()).unwrap().cast::<Counter>().unwrap();
        assert_eq!(back.bind().hits, 1);
        assert_eq!(obj.cast::<Shared>().unwrap_err(), GdError::InvalidCast);
        gd.dispose();
    }
}
