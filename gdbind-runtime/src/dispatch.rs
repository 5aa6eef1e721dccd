// Forwarding entry points for the reflective dispatch surface.
//
// The engine addresses objects by native handle. Each entry point resolves
// the live wrapper, runs the matching `ObjectHooks` method behind a panic
// guard, and falls back to the hook's default when the handle is unknown,
// the wrapper is disposed, or the hook panicked. Out-slots are written only
// after the hook returned normally, so a panic leaves them untouched.

use std::sync::Arc;

use gdbind_ffi::ObjectHandle;

use crate::binding_registry;
use crate::ffi_guard::guard_hook;
use crate::gd::{with_hooks, ErasedInstance, PropertyCache};
use crate::lock_or_recover;
use crate::property::PropertyInfo;
use crate::string_name::StringName;
use crate::traits::ObjectHooks;
use crate::variant::Variant;

fn resolve(obj: ObjectHandle) -> Option<Arc<dyn ErasedInstance>> {
    let instance = binding_registry::lookup(obj)?;
    if instance.base().is_disposed() {
        None
    } else {
        Some(instance)
    }
}

/// Resolve `obj` and run `f` against its hooks. `None` if the object is not
/// live, the call was re-entrant, or the hook panicked.
fn run<R>(obj: ObjectHandle, op: &str, f: impl FnOnce(&mut dyn ObjectHooks) -> R) -> Option<R> {
    let instance = resolve(obj)?;
    let class = instance.base().class_name();
    guard_hook(op, class, None, || with_hooks(&*instance, f))
}

/// Access the descriptor cache of a live wrapper.
pub(crate) fn with_cache<R>(obj: ObjectHandle, f: impl FnOnce(&mut PropertyCache) -> R) -> Option<R> {
    let instance = resolve(obj)?;
    let mut cache = lock_or_recover(&instance.base().cache);
    Some(f(&mut cache))
}

pub fn property_count(obj: ObjectHandle) -> usize {
    let Some(count) = run(obj, "property_count", |h| h.property_count()) else {
        return 0;
    };
    with_cache(obj, |cache| cache.last_count = Some(count));
    count
}

/// Fill `list` with descriptors and return how many entries the hook saw.
///
/// The hook receives at most `min(list.len(), last property_count)` entries,
/// so it can never write past either bound.
pub fn get_property_list(obj: ObjectHandle, list: &mut [PropertyInfo]) -> usize {
    let last = with_cache(obj, |cache| cache.last_count).flatten();
    let limit = last.map_or(list.len(), |count| count.min(list.len()));
    let window = &mut list[..limit];
    match run(obj, "get_property_list", |h| h.get_property_list(window)) {
        Some(()) => limit,
        None => 0,
    }
}

/// Dynamic call. `ret` keeps its previous value for unknown methods.
pub fn call(obj: ObjectHandle, method: &StringName, arg: &Variant, ret: &mut Variant) {
    let mut out = ret.clone();
    if run(obj, "call", |h| h.call(method, arg, &mut out)).is_some() {
        *ret = out;
    }
}

pub fn set(obj: ObjectHandle, property: &StringName, value: &Variant) -> bool {
    run(obj, "set", |h| h.set(property, value)).unwrap_or(false)
}

/// Read a property into `value`. Returns whether the property was recognized;
/// `value` is only written when it was.
pub fn get(obj: ObjectHandle, property: &StringName, value: &mut Variant) -> bool {
    let mut out = value.clone();
    let handled = run(obj, "get", |h| h.get(property, &mut out)).unwrap_or(false);
    if handled {
        *value = out;
    }
    handled
}

/// Let the object rewrite `info`. Returns whether it changed anything;
/// `info` is only written when it did.
pub fn validate_property(obj: ObjectHandle, info: &mut PropertyInfo) -> bool {
    let mut out = info.clone();
    let changed = run(obj, "validate_property", |h| h.validate_property(&mut out)).unwrap_or(false);
    if changed {
        *info = out;
    }
    changed
}

pub fn property_can_revert(obj: ObjectHandle, property: &StringName) -> bool {
    run(obj, "property_can_revert", |h| h.property_can_revert(property)).unwrap_or(false)
}

pub fn property_get_revert(obj: ObjectHandle, property: &StringName, ret: &mut Variant) -> bool {
    let mut out = ret.clone();
    let handled =
        run(obj, "property_get_revert", |h| h.property_get_revert(property, &mut out)).unwrap_or(false);
    if handled {
        *ret = out;
    }
    handled
}

pub fn notification(obj: ObjectHandle, what: i32, reversed: bool) -> bool {
    run(obj, "notification", |h| h.notification(what, reversed)).unwrap_or(false)
}

/// The engine freed `obj`: tear its wrapper down. No-op for unknown handles.
pub fn free_instance(obj: ObjectHandle) {
    if let Some(instance) = binding_registry::lookup(obj) {
        instance.dispose();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gd::Gd;
    use crate::mock_engine;
    use crate::traits::GodotClass;
    use gdbind_ffi::{PropertyHint, VariantType, NOTIFICATION_POSTINITIALIZE};

    /// Two dynamic properties: `speed` (int, revertible to 10) and `title`
    /// (string, shown as multiline text after validation).
    #[derive(Default)]
    pub(crate) struct Props {
        pub speed: i64,
        pub title: String,
    }

    impl ObjectHooks for Props {
        fn property_count(&self) -> usize {
            2
        }

        fn get_property_list(&self, list: &mut [PropertyInfo]) {
            let all = [
                PropertyInfo::new("speed", VariantType::Int),
                PropertyInfo::new("title", VariantType::String),
            ];
            for (slot, info) in list.iter_mut().zip(all) {
                *slot = info;
            }
        }

        fn call(&mut self, method: &StringName, arg: &Variant, ret: &mut Variant) {
            if method == "double" {
                *ret = Variant::Int(arg.as_int().unwrap_or(0) * 2);
            } else if method == "explode" {
                panic!("kaboom");
            }
        }

        fn set(&mut self, property: &StringName, value: &Variant) -> bool {
            match (property.as_str(), value) {
                ("speed", Variant::Int(v)) => self.speed = *v,
                ("title", Variant::String(v)) => self.title = v.clone(),
                _ => return false,
            }
            true
        }

        fn get(&self, property: &StringName, value: &mut Variant) -> bool {
            match property.as_str() {
                "speed" => *value = Variant::Int(self.speed),
                "title" => *value = Variant::from(self.title.as_str()),
                _ => return false,
            }
            true
        }

        fn validate_property(&self, info: &mut PropertyInfo) -> bool {
            if info.name == "title" {
                info.hint = PropertyHint::MultilineText;
                true
            } else {
                false
            }
        }

        fn property_can_revert(&self, property: &StringName) -> bool {
            property == "speed"
        }

        fn property_get_revert(&self, property: &StringName, ret: &mut Variant) -> bool {
            if property == "speed" {
                *ret = Variant::Int(10);
                true
            } else {
                false
            }
        }

        fn notification(&mut self, what: i32, _reversed: bool) -> bool {
            what == NOTIFICATION_POSTINITIALIZE
        }
    }

    impl GodotClass for Props {
        const CLASS_NAME: &'static str = "DispatchTestProps";
    }

    pub(crate) fn spawn_props() -> Gd<Props> {
        mock_engine::install();
        mock_engine::declare_class(Props::CLASS_NAME, false);
        Gd::new(Props::default()).unwrap()
    }

    #[test]
    fn property_list_respects_last_count() {
        let gd = spawn_props();
        let h = gd.handle();
        assert_eq!(property_count(h), 2);

        let mut list = vec![PropertyInfo::default(); 5];
        assert_eq!(get_property_list(h, &mut list), 2);
        assert_eq!(list[0].name, "speed");
        assert_eq!(list[1].kind, VariantType::String);
        assert!(list[2].name.is_empty());

        let mut short = vec![PropertyInfo::default(); 1];
        assert_eq!(get_property_list(h, &mut short), 1);
        assert_eq!(short[0].name, "speed");
        gd.dispose();
    }

    #[test]
    fn unknown_names_leave_slots_untouched() {
        let gd = spawn_props();
        let h = gd.handle();
        let name = StringName::from("no_such_thing");

        let mut ret = Variant::from("sentinel");
        call(h, &name, &Variant::Nil, &mut ret);
        assert_eq!(ret, Variant::from("sentinel"));

        assert!(!set(h, &name, &Variant::Int(1)));

        let mut value = Variant::Bool(true);
        assert!(!get(h, &name, &mut value));
        assert_eq!(value, Variant::Bool(true));

        assert!(!property_can_revert(h, &name));
        assert!(!property_get_revert(h, &name, &mut value));
        assert_eq!(value, Variant::Bool(true));
        gd.dispose();
    }

    #[test]
    fn known_names_reach_the_hooks() {
        let gd = spawn_props();
        let h = gd.handle();

        let mut ret = Variant::Nil;
        call(h, &StringName::from("double"), &Variant::Int(21), &mut ret);
        assert_eq!(ret, Variant::Int(42));

        assert!(set(h, &StringName::from("speed"), &Variant::Int(7)));
        let mut value = Variant::Nil;
        assert!(get(h, &StringName::from("speed"), &mut value));
        assert_eq!(value, Variant::Int(7));
        assert_eq!(gd.bind().speed, 7);

        assert!(property_can_revert(h, &StringName::from("speed")));
        assert!(property_get_revert(h, &StringName::from("speed"), &mut value));
        assert_eq!(value, Variant::Int(10));

        assert!(notification(h, NOTIFICATION_POSTINITIALIZE, false));
        assert!(!notification(h, 99, false));
        gd.dispose();
    }

    #[test]
    fn validate_property_reports_the_change() {
        let gd = spawn_props();
        let h = gd.handle();

        let mut info = PropertyInfo::new("title", VariantType::String);
        assert!(validate_property(h, &mut info));
        assert_eq!(info.hint, PropertyHint::MultilineText);
        assert_eq!(info.name, "title");

        let mut untouched = PropertyInfo::new("speed", VariantType::Int);
        assert!(!validate_property(h, &mut untouched));
        assert_eq!(untouched, PropertyInfo::new("speed", VariantType::Int));
        gd.dispose();
    }

    #[test]
    fn panicking_hook_is_isolated() {
        let gd = spawn_props();
        let h = gd.handle();

        let mut ret = Variant::from("kept");
        call(h, &StringName::from("explode"), &Variant::Nil, &mut ret);
        assert_eq!(ret, Variant::from("kept"));
        assert!(!mock_engine::logs_containing("hook 'call' panicked on DispatchTestProps").is_empty());

        // Still usable afterwards.
        call(h, &StringName::from("double"), &Variant::Int(2), &mut ret);
        assert_eq!(ret, Variant::Int(4));
        gd.dispose();
    }

    #[test]
    fn disposed_and_unknown_objects_use_defaults() {
        let gd = spawn_props();
        let h = gd.handle();
        gd.dispose();

        assert_eq!(property_count(h), 0);
        let mut value = Variant::Nil;
        assert!(!get(h, &StringName::from("speed"), &mut value));
        assert_eq!(value, Variant::Nil);

        let stray = mock_engine::spawn_native("Object");
        assert_eq!(property_count(stray), 0);
        free_instance(stray);
    }

    #[test]
    fn engine_free_disposes_the_wrapper() {
        let gd = spawn_props();
        free_instance(gd.handle());
        assert!(gd.is_disposed());
        assert!(!gd.is_instance_valid());
    }
}
