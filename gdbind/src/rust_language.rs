// The built-in "Rust" script language.

use crate::gdclass;
use crate::runtime::script_language::{self, LanguageSlot, ScriptLanguageExtension};
use crate::runtime::{GdResult, ObjectHooks, StringName, Variant, LOG_DISPLAY};
use crate::rust_script::RustScript;

/// Strict and reserved Rust keywords.
pub const RESERVED_WORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

#[gdclass]
#[derive(Default)]
pub struct RustLanguage {
    initialized: bool,
    frames: u64,
}

impl RustLanguage {
    /// Ticks seen since registration.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl ObjectHooks for RustLanguage {
    fn call(&mut self, method: &StringName, arg: &Variant, ret: &mut Variant) {
        script_language::dispatch(self, method, arg, ret);
    }
}

impl ScriptLanguageExtension for RustLanguage {
    type Script = RustScript;

    fn name(&self) -> &str {
        "Rust"
    }

    fn extension(&self) -> &str {
        "rs"
    }

    fn reserved_words(&self) -> Vec<String> {
        RESERVED_WORDS.iter().map(|w| w.to_string()).collect()
    }

    fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        crate::gdlog!(LOG_DISPLAY, "[gdbind] Rust script language ready");
    }

    fn frame(&mut self) {
        self.frames += 1;
    }
}

/// Process-wide slot of the Rust language.
pub static RUST_LANGUAGE: LanguageSlot<RustLanguage> = LanguageSlot::new();

/// Announce the Rust language to the engine. Called by `init`.
pub fn register_language() -> GdResult<()> {
    RUST_LANGUAGE.register()
}

/// Withdraw the Rust language. Called on shutdown; the language cannot be
/// registered again afterwards.
pub fn unregister_language() -> GdResult<()> {
    RUST_LANGUAGE.unregister()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::GdStr;
    use crate::runtime::mock_engine;
    use crate::runtime::GdObject;
    use crate::tests::{call, callbacks};
    use std::sync::{Mutex, MutexGuard};

    // Every test drives the one process-wide language object.
    fn serial() -> MutexGuard<'static, ()> {
        static SERIAL: Mutex<()> = Mutex::new(());
        SERIAL.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn registered_language_answers_its_name() {
        let _serial = serial();
        callbacks();
        assert!(RUST_LANGUAGE.is_registered());
        let lang = RUST_LANGUAGE.singleton().unwrap();
        assert!(mock_engine::registered_languages().contains(&lang.handle()));
        assert_eq!(lang.bind().name(), "Rust");

        let mut ret = Variant::Nil;
        call(lang.handle(), "_get_name", &Variant::Nil, &mut ret);
        assert_eq!(ret, Variant::from("Rust"));

        call(lang.handle(), "_get_extension", &Variant::Nil, &mut ret);
        assert_eq!(ret, Variant::from("rs"));
        call(lang.handle(), "_get_type", &Variant::Nil, &mut ret);
        assert_eq!(ret, Variant::from("RustScript"));
    }

    #[test]
    fn reserved_words_cover_keywords() {
        let _serial = serial();
        callbacks();
        let lang = RUST_LANGUAGE.singleton().unwrap();
        let mut ret = Variant::Nil;
        call(lang.handle(), "_get_reserved_words", &Variant::Nil, &mut ret);
        let Variant::PackedStringArray(words) = ret else {
            panic!("expected a packed string array");
        };
        for kw in ["fn", "impl", "unsafe", "Self", "yield"] {
            assert!(words.iter().any(|w| w == kw), "missing {kw}");
        }
    }

    #[test]
    fn init_logs_once_and_frames_count() {
        let _serial = serial();
        let cb = callbacks();
        let lang = RUST_LANGUAGE.singleton().unwrap();
        call(lang.handle(), "_init", &Variant::Nil, &mut Variant::Nil);
        call(lang.handle(), "_init", &Variant::Nil, &mut Variant::Nil);
        assert!(lang.bind().is_initialized());
        assert_eq!(mock_engine::logs_containing("Rust script language ready").len(), 1);

        let before = lang.bind().frames();
        (cb.frame)();
        (cb.frame)();
        assert_eq!(lang.bind().frames(), before + 2);
    }

    #[test]
    fn create_script_through_the_engine_boundary() {
        let _serial = serial();
        callbacks();
        let lang = RUST_LANGUAGE.singleton().unwrap();
        let mut ret = Variant::Nil;
        call(lang.handle(), "_create_script", &Variant::Nil, &mut ret);
        let Variant::Object(script) = ret else {
            panic!("expected a script object");
        };
        assert_eq!(script.class_name(), "RustScript");
        assert_eq!(mock_engine::reference_count(script.handle()), Some(1));
        assert_eq!(GdObject::lookup(script.handle()), Some(script.clone()));
    }

    #[test]
    fn global_class_queries() {
        let _serial = serial();
        let cb = callbacks();
        mock_engine::declare_global_type("LanguageTestGlobal");
        let lang = RUST_LANGUAGE.singleton().unwrap();

        let mut ret = Variant::Nil;
        call(lang.handle(), "_handles_global_class_type", &Variant::from("LanguageTestGlobal"), &mut ret);
        assert_eq!(ret, Variant::Bool(true));
        call(lang.handle(), "_handles_global_class_type", &Variant::from("Nope"), &mut ret);
        assert_eq!(ret, Variant::Bool(false));

        // Unknown names leave the result alone.
        let mut untouched = Variant::from("keep");
        call(lang.handle(), "_get_comment_delimiters", &Variant::Nil, &mut untouched);
        assert_eq!(untouched, Variant::from("keep"));
        assert!(!(cb.set)(lang.handle(), GdStr::new("anything"), std::ptr::null()));
    }
}
