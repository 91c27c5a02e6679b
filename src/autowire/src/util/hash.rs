use std::any::Any;
use std::hash::{Hash, Hasher};

/// Object-safe equality and hashing for type-erased qualifier values. The
/// concrete `TypeId` participates in the hash, so equal representations of
/// different types never compare or hash alike.
pub trait DynHash: Any {
    fn dyn_eq(&self, other: &dyn Any) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: Eq + Hash + 'static> DynHash for T {
    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.type_id().hash(&mut state);
        self.hash(&mut state);
    }
}

#[cfg(test)]
mod tests {
    use std::hash::DefaultHasher;

    use super::*;

    fn hash_of(value: &dyn DynHash) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.dyn_hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn dyn_eq_succeeds_only_when_types_and_values_match() {
        assert!("gear".dyn_eq(&"gear"));
        assert!(!"gear".dyn_eq(&"cog"));
        assert!(!1u32.dyn_eq(&1i32));
    }

    #[test]
    fn dyn_hash_separates_values_of_different_types() {
        assert_eq!(hash_of(&"gear"), hash_of(&"gear"));
        assert_ne!(hash_of(&"gear"), hash_of(&"cog"));
        assert_ne!(hash_of(&1u32), hash_of(&1i32));
    }
}
