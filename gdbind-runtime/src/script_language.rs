// Scripting-language registration adapter.
//
// A script language is an ordinary Rust class that the engine talks to
// through dynamic calls (`_get_name`, `_frame`, ...). This module provides:
// - `ScriptLanguageExtension`: the identity and lifecycle surface a language
//   implements.
// - `LanguageMethod` + `can_call` + `dispatch`: the closed set of method names
//   the engine may call, routed onto that surface.
// - `LanguageSlot<L>`: the process-wide singleton slot with its registration
//   state machine (Unregistered -> Registered -> Retired).

use std::sync::Mutex;

use crate::error::{check_ffi_ctx, GdError, GdResult};
use crate::ffi_dispatch;
use crate::ffi_guard::guard_hook;
use crate::gd::Gd;
use crate::lock_or_recover;
use crate::logging::{log_message, LOG_DISPLAY, LOG_ERROR};
use crate::string_name::StringName;
use crate::traits::GodotClass;
use crate::type_db;
use crate::variant::Variant;

/// Identity and lifecycle of a scripting language.
///
/// Identity values are fixed for the lifetime of the language object.
pub trait ScriptLanguageExtension: GodotClass {
    /// Script objects created by this language.
    type Script: GodotClass + Default;

    /// Display name, e.g. "Rust".
    fn name(&self) -> &str;

    /// Source file extension without the dot.
    fn extension(&self) -> &str;

    fn reserved_words(&self) -> Vec<String>;

    fn supports_documentation(&self) -> bool {
        false
    }

    /// Type tag of the scripts this language creates.
    fn script_type(&self) -> &str {
        <Self::Script as GodotClass>::CLASS_NAME
    }

    /// Whether `class_name` names a global class the engine's type database knows.
    fn handles_global_class_type(&self, class_name: &str) -> bool {
        type_db::search(class_name).is_some()
    }

    /// Called by the engine once after registration.
    fn init(&mut self) {}

    /// Called by the engine once per tick.
    fn frame(&mut self) {}

    /// A new script object on every call.
    fn create_script(&self) -> GdResult<Gd<Self::Script>> {
        Gd::new(Self::Script::default())
    }
}

// ---------------------------------------------------------------------------
// Method names
// ---------------------------------------------------------------------------

/// Engine-facing method names a script language answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LanguageMethod {
    CreateScript,
    GetName,
    GetReservedWords,
    SupportsDocumentation,
    GetExtension,
    GetType,
    Init,
    HandlesGlobalClassType,
    Frame,
}

impl LanguageMethod {
    pub const ALL: [LanguageMethod; 9] = [
        LanguageMethod::CreateScript,
        LanguageMethod::GetName,
        LanguageMethod::GetReservedWords,
        LanguageMethod::SupportsDocumentation,
        LanguageMethod::GetExtension,
        LanguageMethod::GetType,
        LanguageMethod::Init,
        LanguageMethod::HandlesGlobalClassType,
        LanguageMethod::Frame,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LanguageMethod::CreateScript => "_create_script",
            LanguageMethod::GetName => "_get_name",
            LanguageMethod::GetReservedWords => "_get_reserved_words",
            LanguageMethod::SupportsDocumentation => "_supports_documentation",
            LanguageMethod::GetExtension => "_get_extension",
            LanguageMethod::GetType => "_get_type",
            LanguageMethod::Init => "_init",
            LanguageMethod::HandlesGlobalClassType => "_handles_global_class_type",
            LanguageMethod::Frame => "_frame",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Whether [`dispatch`] handles `method`.
pub fn can_call(method: &str) -> bool {
    LanguageMethod::from_name(method).is_some()
}

/// Route an engine call onto `lang`. Reads at most `arg`, writes at most
/// `ret`. Returns false (and touches nothing) for unknown names.
pub fn dispatch<L: ScriptLanguageExtension>(
    lang: &mut L,
    method: &StringName,
    arg: &Variant,
    ret: &mut Variant,
) -> bool {
    let Some(method) = LanguageMethod::from_name(method.as_str()) else {
        return false;
    };
    match method {
        LanguageMethod::CreateScript => match lang.create_script() {
            Ok(script) => *ret = Variant::Object(script.upcast()),
            Err(err) => log_message(
                LOG_ERROR,
                &format!("[gdbind] {}: _create_script failed: {err}", L::CLASS_NAME),
            ),
        },
        LanguageMethod::GetName => *ret = Variant::from(lang.name()),
        LanguageMethod::GetReservedWords => *ret = Variant::from(lang.reserved_words()),
        LanguageMethod::SupportsDocumentation => {
            *ret = Variant::from(lang.supports_documentation())
        }
        LanguageMethod::GetExtension => *ret = Variant::from(lang.extension()),
        LanguageMethod::GetType => *ret = Variant::from(lang.script_type()),
        LanguageMethod::Init => lang.init(),
        LanguageMethod::HandlesGlobalClassType => {
            let class_name = arg.as_str().unwrap_or_default();
            *ret = Variant::from(lang.handles_global_class_type(class_name));
        }
        LanguageMethod::Frame => lang.frame(),
    }
    true
}

// ---------------------------------------------------------------------------
// Singleton slot
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    Unregistered,
    Registered,
    /// Unregistered after having been registered. Terminal.
    Retired,
}

struct SlotState<L: GodotClass> {
    instance: Option<Gd<L>>,
    registration: Registration,
}

/// Process-wide home of one script language.
///
/// The language object is created lazily on first use and at most once per
/// process. It is kept after unregistration so late engine calls still find
/// a live object.
pub struct LanguageSlot<L: ScriptLanguageExtension + Default> {
    state: Mutex<SlotState<L>>,
}

impl<L: ScriptLanguageExtension + Default> LanguageSlot<L> {
    pub const fn new() -> Self {
        LanguageSlot {
            state: Mutex::new(SlotState {
                instance: None,
                registration: Registration::Unregistered,
            }),
        }
    }

    fn singleton_locked(state: &mut SlotState<L>) -> GdResult<Gd<L>> {
        if let Some(instance) = &state.instance {
            return Ok(instance.clone());
        }
        let instance = crate::class_registry::instantiate_managed::<L>()?;
        state.instance = Some(instance.clone());
        Ok(instance)
    }

    /// The language object, created on first call.
    pub fn singleton(&self) -> GdResult<Gd<L>> {
        Self::singleton_locked(&mut lock_or_recover(&self.state))
    }

    /// The language object if it was already created.
    pub fn get(&self) -> Option<Gd<L>> {
        lock_or_recover(&self.state).instance.clone()
    }

    pub fn registration(&self) -> Registration {
        lock_or_recover(&self.state).registration
    }

    pub fn is_registered(&self) -> bool {
        self.registration() == Registration::Registered
    }

    /// Announce the language to the engine. A no-op when already registered.
    /// Registering again after [`unregister`](Self::unregister) is not supported.
    pub fn register(&self) -> GdResult<()> {
        let mut state = lock_or_recover(&self.state);
        match state.registration {
            Registration::Registered => return Ok(()),
            Registration::Retired => {
                return Err(GdError::InvalidOperation(format!(
                    "{} cannot be registered again after unregistration",
                    L::CLASS_NAME
                )));
            }
            Registration::Unregistered => {}
        }
        let instance = Self::singleton_locked(&mut state)?;
        // SAFETY: singleton creation succeeded, so the API is initialized.
        let code = unsafe { ffi_dispatch::engine_register_script_language(instance.handle()) };
        check_ffi_ctx(code, L::CLASS_NAME)?;
        state.registration = Registration::Registered;
        log_message(
            LOG_DISPLAY,
            &format!("[gdbind] registered script language {}", L::CLASS_NAME),
        );
        Ok(())
    }

    /// Withdraw the language from the engine. A no-op unless registered.
    ///
    /// If the engine refuses, the slot stays registered and the call can be
    /// retried.
    pub fn unregister(&self) -> GdResult<()> {
        let mut state = lock_or_recover(&self.state);
        if state.registration != Registration::Registered {
            return Ok(());
        }
        let handle = state.instance.as_ref().map(Gd::handle).unwrap_or_default();
        // SAFETY: the language was registered, so the API is initialized.
        let code = unsafe { ffi_dispatch::engine_unregister_script_language(handle) };
        check_ffi_ctx(code, L::CLASS_NAME)?;
        state.registration = Registration::Retired;
        Ok(())
    }

    /// Forward one engine tick. Skipped unless registered.
    pub fn frame(&self) {
        self.forward("frame", |lang| lang.frame());
    }

    fn forward(&self, op: &str, f: impl FnOnce(&mut L)) {
        let instance = {
            let state = lock_or_recover(&self.state);
            if state.registration != Registration::Registered {
                return;
            }
            state.instance.clone()
        };
        let Some(instance) = instance else {
            return;
        };
        guard_hook(op, L::CLASS_NAME, (), || {
            if let Some(mut lang) = instance.try_bind() {
                f(&mut lang);
            }
        });
    }
}

impl<L: ScriptLanguageExtension + Default> Default for LanguageSlot<L> {
    fn default() -> Self {
        Self::new()
    }
}
