// Wire-level enums and the property descriptor quadruple. Discriminants match
// the engine's own numbering and must not be reordered.

use crate::handles::GdStr;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident = $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[repr(u32)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            /// Decode a raw tag received from the engine. Unknown tags yield `None`.
            pub fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            #[inline]
            pub fn to_raw(self) -> u32 {
                self as u32
            }
        }
    };
}

wire_enum! {
    /// Value-kind tag of an exchanged value.
    pub enum VariantType {
        Nil = 0,
        Bool = 1,
        Int = 2,
        Float = 3,
        String = 4,
        Vector2 = 5,
        Vector2i = 6,
        Rect2 = 7,
        Rect2i = 8,
        Vector3 = 9,
        Vector3i = 10,
        Transform2D = 11,
        Vector4 = 12,
        Vector4i = 13,
        Plane = 14,
        Quaternion = 15,
        Aabb = 16,
        Basis = 17,
        Transform3D = 18,
        Projection = 19,
        Color = 20,
        StringName = 21,
        NodePath = 22,
        Rid = 23,
        Object = 24,
        Callable = 25,
        Signal = 26,
        Dictionary = 27,
        Array = 28,
        PackedByteArray = 29,
        PackedInt32Array = 30,
        PackedInt64Array = 31,
        PackedFloat32Array = 32,
        PackedFloat64Array = 33,
        PackedStringArray = 34,
        PackedVector2Array = 35,
        PackedVector3Array = 36,
        PackedColorArray = 37,
        PackedVector4Array = 38,
    }
}

wire_enum! {
    /// Editor/usage hint attached to a property descriptor.
    pub enum PropertyHint {
        None = 0,
        Range = 1,
        Enum = 2,
        EnumSuggestion = 3,
        ExpEasing = 4,
        Link = 5,
        Flags = 6,
        Layers2DRender = 7,
        Layers2DPhysics = 8,
        Layers2DNavigation = 9,
        Layers3DRender = 10,
        Layers3DPhysics = 11,
        Layers3DNavigation = 12,
        File = 13,
        Dir = 14,
        GlobalFile = 15,
        GlobalDir = 16,
        ResourceType = 17,
        MultilineText = 18,
        Expression = 19,
        PlaceholderText = 20,
        ColorNoAlpha = 21,
        ObjectId = 22,
        TypeString = 23,
        NodePathToEditedNode = 24,
        ObjectTooBig = 25,
        NodePathValidTypes = 26,
        SaveFile = 27,
        GlobalSaveFile = 28,
        IntIsObjectId = 29,
        IntIsPointer = 30,
        ArrayType = 31,
        LocaleId = 32,
        LocalizableString = 33,
        NodeType = 34,
        HideQuaternionEdit = 35,
        Password = 36,
    }
}

// Object notification codes delivered through the `notification` callback.
pub const NOTIFICATION_POSTINITIALIZE: i32 = 0;
pub const NOTIFICATION_PREDELETE: i32 = 1;
pub const NOTIFICATION_EXTENSION_RELOADED: i32 = 2;

/// Property descriptor as it crosses the boundary: `{name, kind, hint, hint_string}`.
///
/// `kind` is a raw [`VariantType`] tag and `hint` a raw [`PropertyHint`] tag.
/// They stay raw so a tag the engine knows and we don't is never UB.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct GdPropertyInfo {
    pub name: GdStr,
    pub kind: u32,
    pub hint: u32,
    pub hint_string: GdStr,
}
