// In-process stand-in for the engine side of the API table.
//
// Compiled for this crate's tests and, behind the `mock-engine` feature, for
// tests of downstream crates. Every table entry is implemented against one
// global state; the inspection helpers read it back.
//
// Native objects are never freed by the mock. A refcounted object whose count
// reaches zero stays inspectable so tests can assert on the final count.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, Once, OnceLock};

use gdbind_ffi::*;

use crate::lock_or_recover;

#[derive(Debug, Clone)]
pub struct MockObject {
    pub class_name: String,
    pub refcounted: bool,
    pub refcount: i64,
    /// Successful `reference` calls over the object's lifetime.
    pub acquires: u32,
    /// `unreference` calls over the object's lifetime.
    pub releases: u32,
    /// Binding passed to `make_handle_for_managed`, if the object was made for one.
    pub binding: BindingHandle,
}

#[derive(Default)]
struct MockState {
    next_addr: u64,
    objects: HashMap<u64, MockObject>,
    /// Registered classes in registration order: (name, refcounted).
    classes: Vec<(String, bool)>,
    global_types: HashSet<String>,
    languages: Vec<u64>,
    /// Languages whose next unregistration the engine refuses.
    refuse_unregister: HashSet<u64>,
    logs: Vec<(u8, String)>,
}

impl MockState {
    fn alloc_addr(&mut self) -> u64 {
        if self.next_addr == 0 {
            self.next_addr = 0x1000;
        }
        let addr = self.next_addr;
        self.next_addr += 16;
        addr
    }

    fn class_index(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|(n, _)| n == name)
    }

    fn declare_class(&mut self, name: &str, refcounted: bool) -> ClassHandle {
        let index = match self.class_index(name) {
            Some(index) => index,
            None => {
                self.classes.push((name.to_string(), refcounted));
                self.classes.len() - 1
            }
        };
        class_handle(index)
    }

    fn spawn(&mut self, class_name: &str, binding: BindingHandle) -> ObjectHandle {
        let refcounted = self
            .class_index(class_name)
            .map(|i| self.classes[i].1)
            .unwrap_or(false);
        let addr = self.alloc_addr();
        self.objects.insert(
            addr,
            MockObject {
                class_name: class_name.to_string(),
                refcounted,
                refcount: 0,
                acquires: 0,
                releases: 0,
                binding,
            },
        );
        ObjectHandle::from_addr(addr)
    }
}

fn class_handle(index: usize) -> ClassHandle {
    ClassHandle::from_addr(((index as u64) + 1) << 4)
}

fn class_index_of(class: ClassHandle) -> Option<usize> {
    let addr = class.to_addr();
    (addr != 0 && addr & 0xF == 0).then(|| (addr >> 4) as usize - 1)
}

fn state() -> MutexGuard<'static, MockState> {
    static STATE: OnceLock<Mutex<MockState>> = OnceLock::new();
    lock_or_recover(STATE.get_or_init(|| Mutex::new(MockState::default())))
}

unsafe fn read(name: GdStr) -> String {
    unsafe { name.as_str() }.unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// Table entries
// ---------------------------------------------------------------------------

unsafe extern "C" fn get_class_name(
    obj: ObjectHandle,
    buf: *mut u8,
    buf_len: u32,
    out_len: *mut u32,
) -> GdErrorCode {
    let st = state();
    let Some(object) = st.objects.get(&obj.to_addr()) else {
        return GdErrorCode::ObjectDisposed;
    };
    let bytes = object.class_name.as_bytes();
    if !out_len.is_null() {
        unsafe { *out_len = bytes.len() as u32 };
    }
    if bytes.len() > buf_len as usize {
        return GdErrorCode::BufferTooSmall;
    }
    if buf.is_null() {
        return GdErrorCode::NullArgument;
    }
    unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf, bytes.len()) };
    GdErrorCode::Ok
}

unsafe extern "C" fn register_class(name: GdStr, refcounted: bool) -> GdErrorCode {
    let name = unsafe { read(name) };
    if name.is_empty() {
        return GdErrorCode::NullArgument;
    }
    state().declare_class(&name, refcounted);
    GdErrorCode::Ok
}

unsafe extern "C" fn resolve_constructible_type(name: GdStr) -> ClassHandle {
    let name = unsafe { read(name) };
    state()
        .class_index(&name)
        .map(class_handle)
        .unwrap_or_default()
}

unsafe extern "C" fn make_handle_for_managed(
    class: ClassHandle,
    binding: BindingHandle,
) -> ObjectHandle {
    let mut st = state();
    let Some(name) = class_index_of(class).and_then(|i| st.classes.get(i)).map(|c| c.0.clone())
    else {
        return ObjectHandle::null();
    };
    st.spawn(&name, binding)
}

unsafe extern "C" fn reference(obj: ObjectHandle) -> bool {
    let mut st = state();
    match st.objects.get_mut(&obj.to_addr()) {
        Some(object) if object.refcounted => {
            object.refcount += 1;
            object.acquires += 1;
            true
        }
        _ => false,
    }
}

unsafe extern "C" fn unreference(obj: ObjectHandle) -> bool {
    let mut st = state();
    match st.objects.get_mut(&obj.to_addr()) {
        Some(object) if object.refcounted => {
            object.releases += 1;
            object.refcount = (object.refcount - 1).max(0);
            object.refcount == 0
        }
        _ => false,
    }
}

unsafe extern "C" fn get_reference_count(obj: ObjectHandle) -> i64 {
    match state().objects.get(&obj.to_addr()) {
        Some(object) if object.refcounted => object.refcount,
        _ => -1,
    }
}

unsafe extern "C" fn search(name: GdStr, out_class: *mut ClassHandle) -> bool {
    let name = unsafe { read(name) };
    let mut st = state();
    if !st.global_types.contains(&name) {
        return false;
    }
    let class = st.declare_class(&name, false);
    if !out_class.is_null() {
        unsafe { *out_class = class };
    }
    true
}

unsafe extern "C" fn register_script_language(language: ObjectHandle) -> GdErrorCode {
    if language.is_null() {
        return GdErrorCode::NullArgument;
    }
    let mut st = state();
    if st.languages.contains(&language.to_addr()) {
        return GdErrorCode::InvalidOperation;
    }
    st.languages.push(language.to_addr());
    GdErrorCode::Ok
}

unsafe extern "C" fn unregister_script_language(language: ObjectHandle) -> GdErrorCode {
    let mut st = state();
    if st.refuse_unregister.remove(&language.to_addr()) {
        return GdErrorCode::InternalError;
    }
    match st.languages.iter().position(|&addr| addr == language.to_addr()) {
        Some(index) => {
            st.languages.remove(index);
            GdErrorCode::Ok
        }
        None => GdErrorCode::InvalidOperation,
    }
}

unsafe extern "C" fn log(level: u8, msg: *const u8, msg_len: u32) {
    let text = if msg.is_null() {
        String::new()
    } else {
        let bytes = unsafe { std::slice::from_raw_parts(msg, msg_len as usize) };
        String::from_utf8_lossy(bytes).into_owned()
    };
    state().logs.push((level, text));
}

static CORE: GdCoreApi = GdCoreApi { get_class_name };

static CLASS_DB: GdClassDbApi = GdClassDbApi {
    register_class,
    resolve_constructible_type,
    make_handle_for_managed,
};

static REFCOUNT: GdRefCountApi = GdRefCountApi {
    reference,
    unreference,
    get_reference_count,
};

static TYPE_DB: GdTypeDbApi = GdTypeDbApi { search };

static ENGINE: GdEngineApi = GdEngineApi {
    register_script_language,
    unregister_script_language,
};

static LOGGING: GdLoggingApi = GdLoggingApi { log };

static TABLE: GdApiTable = GdApiTable {
    version: GDBIND_API_VERSION,
    core: &CORE,
    class_db: &CLASS_DB,
    refcount: &REFCOUNT,
    type_db: &TYPE_DB,
    engine: &ENGINE,
    logging: &LOGGING,
};

// ---------------------------------------------------------------------------
// Setup + inspection
// ---------------------------------------------------------------------------

/// The mock API table, for callers that install it themselves.
pub fn table() -> *const GdApiTable {
    &TABLE
}

/// Install the mock table and register every inventory class. Idempotent.
pub fn install() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        crate::api::init_api(table());
        crate::class_registry::register_all_from_inventory();
    });
}

/// Make `name` constructible without going through inventory.
pub fn declare_class(name: &str, refcounted: bool) {
    state().declare_class(name, refcounted);
}

/// Make `name` visible to the type database.
pub fn declare_global_type(name: &str) {
    state().global_types.insert(name.to_string());
}

/// Create a native object the way the engine would (no binding).
pub fn spawn_native(class_name: &str) -> ObjectHandle {
    state().spawn(class_name, BindingHandle::NULL)
}

pub fn object(handle: ObjectHandle) -> Option<MockObject> {
    state().objects.get(&handle.to_addr()).cloned()
}

/// Reference count of a refcounted object, whatever the wrappers think.
pub fn reference_count(handle: ObjectHandle) -> Option<i64> {
    object(handle).filter(|o| o.refcounted).map(|o| o.refcount)
}

pub fn is_class_registered(name: &str) -> bool {
    state().class_index(name).is_some()
}

pub fn registered_languages() -> Vec<ObjectHandle> {
    state()
        .languages
        .iter()
        .map(|&addr| ObjectHandle::from_addr(addr))
        .collect()
}

/// Make the engine fail the next unregistration of `language`, keeping it registered.
pub fn refuse_next_unregister(language: ObjectHandle) {
    state().refuse_unregister.insert(language.to_addr());
}

pub fn logs() -> Vec<(u8, String)> {
    state().logs.clone()
}

/// Logged messages containing `needle`.
pub fn logs_containing(needle: &str) -> Vec<String> {
    state()
        .logs
        .iter()
        .filter(|(_, msg)| msg.contains(needle))
        .map(|(_, msg)| msg.clone())
        .collect()
}
