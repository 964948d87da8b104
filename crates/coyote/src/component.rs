//! Component type descriptors.
//!
//! The host describes each component kind once with a [`TypeDescriptor`]:
//! a numeric id, the byte size of its records and a display name. The
//! engine compares ids and allocates `size` bytes; it never looks inside.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// Unique identifier for a component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentId(u32);

impl ComponentId {
    /// Create a component ID from a raw value.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

/// Static metadata for a component kind.
///
/// Two descriptors describe the same type iff their ids match; equality and
/// hashing only look at the id.
///
/// # Example
///
/// ```
/// use coyote::{TypeDescriptor, type_descriptor};
///
/// #[repr(C)]
/// struct Apple {
///     weight: f32,
///     bites: u32,
/// }
///
/// const APPLE: TypeDescriptor = type_descriptor!(0, Apple);
/// assert_eq!(APPLE.size(), 8);
/// assert_eq!(APPLE.name(), "Apple");
/// ```
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: ComponentId,
    size: usize,
    name: &'static str,
}

impl TypeDescriptor {
    /// Descriptor for type `id` whose records are `size` bytes.
    #[must_use]
    pub const fn new(id: u32, size: usize, name: &'static str) -> Self {
        Self {
            id: ComponentId(id),
            size,
            name,
        }
    }

    /// Descriptor sized for `T`, named after its Rust type path.
    #[must_use]
    pub fn of<T: 'static>(id: u32) -> Self {
        Self::new(id, size_of::<T>(), std::any::type_name::<T>())
    }

    /// Type id; the only field compared when matching types.
    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    /// Size in bytes of one record.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Display name, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id.0)
            .field("size", &self.size)
            .field("name", &self.name)
            .finish()
    }
}

/// Build a [`TypeDescriptor`] for a Rust type in a `const` context.
///
/// `type_descriptor!(3, Pear)` is `TypeDescriptor::new(3, size_of::<Pear>(), "Pear")`.
#[macro_export]
macro_rules! type_descriptor {
    ($id:expr, $ty:ty) => {
        $crate::TypeDescriptor::new($id, ::core::mem::size_of::<$ty>(), stringify!($ty))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position {
        x: f32,
        y: f32,
    }

    struct Tag;

    const POSITION: TypeDescriptor = type_descriptor!(7, Position);

    #[test]
    fn test_macro_descriptor() {
        assert_eq!(POSITION.id(), ComponentId::from_raw(7));
        assert_eq!(POSITION.size(), size_of::<Position>());
        assert_eq!(POSITION.name(), "Position");
    }

    #[test]
    fn test_of_descriptor() {
        let desc = TypeDescriptor::of::<Tag>(1);
        assert_eq!(desc.size(), 0);
        assert!(desc.name().ends_with("Tag"));
    }

    #[test]
    fn test_same_type_by_id() {
        let a = TypeDescriptor::new(3, 4, "a");
        let b = TypeDescriptor::new(3, 16, "renamed");
        let c = TypeDescriptor::new(4, 4, "a");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_component_id_is_a_plain_number() {
        let id = ComponentId::from_raw(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<ComponentId>("42").unwrap(), id);
    }
}
