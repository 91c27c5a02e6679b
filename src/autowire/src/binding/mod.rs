mod descriptor;

use std::any::TypeId;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

use crate::util::any::AsAny;
use crate::util::hash::DynHash;

pub use descriptor::{DescriptorKind, TypeDescriptor};

/// The stand-in target for an unbounded wildcard type argument. A container
/// which wants to serve unbounded points can register a binding under this
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unbounded;

/// Identity of a resolvable type: its [`TypeId`] plus the type's name kept
/// around for diagnostics. Equality and hashing consider the [`TypeId`] only.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The key an unbounded wildcard resolves to.
    pub fn any() -> Self {
        Self::of::<Unbounded>()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name)
    }
}

/// An opaque qualifier value extracted from a marker, used to disambiguate
/// multiple bindings of the same type.
pub trait Tag
where
    Self: Debug + AsAny + DynHash + Send + Sync + 'static,
{
    fn dyn_clone(&self) -> Box<dyn Tag>;
}

impl<T> Tag for T
where
    T: Clone + Debug + Eq + Hash + Send + Sync + 'static,
{
    fn dyn_clone(&self) -> Box<dyn Tag> {
        Box::new(self.clone())
    }
}

impl PartialEq for dyn Tag {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other.as_any())
    }
}

impl Eq for dyn Tag {}

impl Hash for dyn Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

impl Clone for Box<dyn Tag> {
    fn clone(&self) -> Self {
        (**self).dyn_clone()
    }
}

/// A fully concretized lookup key against the backing container: a resolved
/// type plus an optional tag. Two bindings that refer to the same container
/// binding compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeBinding {
    key: TypeKey,
    tag: Option<Box<dyn Tag>>,
}

impl TypeBinding {
    pub fn new(key: TypeKey, tag: Option<Box<dyn Tag>>) -> Self {
        Self { key, tag }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), None)
    }

    pub fn tagged<T: ?Sized + 'static>(tag: impl Tag) -> Self {
        Self::new(TypeKey::of::<T>(), Some(Box::new(tag)))
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn tag(&self) -> Option<&dyn Tag> {
        self.tag.as_deref()
    }
}

impl Display for TypeBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.tag {
            Some(tag) => write!(f, "{}@{:?}", self.key, tag),
            None => Display::fmt(&self.key, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_key_eq_ignores_name() {
        assert_eq!(TypeKey::of::<i32>(), TypeKey::of::<i32>());
        assert_ne!(TypeKey::of::<i32>(), TypeKey::of::<i64>());
        assert_eq!(TypeKey::any(), TypeKey::of::<Unbounded>());
    }

    #[test]
    fn binding_eq_succeeds_when_tags_match() {
        let plain = TypeBinding::of::<String>();
        let gear1 = TypeBinding::tagged::<String>("gear");
        let gear2 = TypeBinding::tagged::<String>("gear");
        let cog = TypeBinding::tagged::<String>("cog");

        assert_eq!(gear1, gear2);
        assert_ne!(plain, gear1);
        assert_ne!(gear1, cog);
    }

    #[test]
    fn binding_eq_fails_when_tag_types_differ() {
        let named = TypeBinding::tagged::<String>("1");
        let numbered = TypeBinding::tagged::<String>(1i32);
        assert_ne!(named, numbered);
    }

    #[test]
    fn binding_display_succeeds() {
        let binding = TypeBinding::tagged::<i32>("gear");
        assert_eq!(binding.to_string(), "i32@\"gear\"");
        assert_eq!(TypeBinding::of::<i32>().to_string(), "i32");
    }
}
