use gdbind::ffi::NOTIFICATION_POSTINITIALIZE;
use gdbind::prelude::*;

const HEALTH: &str = "health";
const MAX_HEALTH: &str = "max_health";
const SAVE_DIR: &str = "save_dir";

/// Player health plus where the save files go. All three fields are exposed
/// to the inspector as dynamic properties.
#[gdclass]
pub struct PlayerStats {
    health: i64,
    max_health: i64,
    save_dir: String,
}

impl Default for PlayerStats {
    fn default() -> Self {
        PlayerStats {
            health: 0,
            max_health: 100,
            save_dir: "user://saves".into(),
        }
    }
}

impl PlayerStats {
    pub fn health(&self) -> i64 {
        self.health
    }

    fn heal(&mut self, amount: i64) -> i64 {
        self.health = self.health.saturating_add(amount).clamp(0, self.max_health);
        self.health
    }
}

impl ObjectHooks for PlayerStats {
    fn property_count(&self) -> usize {
        3
    }

    fn get_property_list(&self, list: &mut [PropertyInfo]) {
        let all = [
            PropertyInfo::new(HEALTH, VariantType::Int).with_hint(PropertyHint::Range, "0,100"),
            PropertyInfo::new(MAX_HEALTH, VariantType::Int),
            PropertyInfo::export_dir(SAVE_DIR),
        ];
        for (slot, info) in list.iter_mut().zip(all) {
            *slot = info;
        }
    }

    fn call(&mut self, method: &StringName, arg: &Variant, ret: &mut Variant) {
        match method.as_str() {
            "heal" => *ret = Variant::Int(self.heal(arg.as_int().unwrap_or(0))),
            "take_damage" => *ret = Variant::Int(self.heal(arg.as_int().unwrap_or(0).saturating_neg())),
            _ => {}
        }
    }

    fn set(&mut self, property: &StringName, value: &Variant) -> bool {
        match (property.as_str(), value) {
            (HEALTH, Variant::Int(v)) => self.health = (*v).clamp(0, self.max_health),
            (MAX_HEALTH, Variant::Int(v)) if *v > 0 => {
                self.max_health = *v;
                self.health = self.health.min(*v);
            }
            (SAVE_DIR, v) => match v.as_str() {
                Some(dir) => self.save_dir = dir.to_string(),
                None => return false,
            },
            _ => return false,
        }
        true
    }

    fn get(&self, property: &StringName, value: &mut Variant) -> bool {
        *value = match property.as_str() {
            HEALTH => Variant::Int(self.health),
            MAX_HEALTH => Variant::Int(self.max_health),
            SAVE_DIR => Variant::from(self.save_dir.as_str()),
            _ => return false,
        };
        true
    }

    // The health slider follows the current maximum.
    fn validate_property(&self, info: &mut PropertyInfo) -> bool {
        if info.name != HEALTH {
            return false;
        }
        info.hint = PropertyHint::Range;
        info.hint_string = format!("0,{}", self.max_health);
        true
    }

    fn property_can_revert(&self, property: &StringName) -> bool {
        property == MAX_HEALTH && self.max_health != 100
    }

    fn property_get_revert(&self, property: &StringName, ret: &mut Variant) -> bool {
        if property != MAX_HEALTH {
            return false;
        }
        *ret = Variant::Int(100);
        true
    }

    fn notification(&mut self, what: i32, _reversed: bool) -> bool {
        if what == NOTIFICATION_POSTINITIALIZE {
            self.health = self.max_health;
            return true;
        }
        false
    }

    fn on_dispose(&mut self, finalizing: bool) {
        gdlog!(
            LOG_DISPLAY,
            "[example] PlayerStats released (health {}, finalizing: {finalizing})",
            self.health
        );
    }
}
