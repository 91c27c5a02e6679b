mod cache;
mod classify;

use std::any::{self, Any};
use std::sync::Arc;

use snafu::prelude::*;

use crate::binding::Tag;
use crate::container::{Container, ResolveError};
use crate::injector::cache::AccessorCache;
use crate::marker::{Marker, QualifierRegistry};
use crate::reflect::{PointLocation, Reflected};

/// Errors raised while classifying a class's injection points or while
/// driving an injection. Container failures pass through unchanged.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InjectError {
    #[snafu(display(
        "could not pick an injection constructor for `{class}` among {count} candidates"
    ))]
    #[non_exhaustive]
    AmbiguousConstructor { class: &'static str, count: usize },
    #[snafu(display("`{class}` declares no constructor to inject through"))]
    #[non_exhaustive]
    MissingConstructor { class: &'static str },
    #[snafu(display("{point} requests a provider but is not zero-argument function-typed"))]
    #[non_exhaustive]
    ProviderShape { point: PointLocation },
    #[snafu(display("{point} requests a factory but is not one-argument function-typed"))]
    #[non_exhaustive]
    FactoryShape { point: PointLocation },
    #[snafu(transparent)]
    Resolution { source: ResolveError },
}

/// The injection driver over a backing [`Container`]: classifies each class's
/// injection points once, caches the compiled accessors, and replays them
/// against receivers on demand.
///
/// Qualifier registration happens before the injector is shared; resolution
/// itself takes `&self` and never holds a lock across a container call.
pub struct Injector {
    container: Arc<dyn Container>,
    qualifiers: QualifierRegistry,
    accessors: AccessorCache,
}

impl Injector {
    pub fn new(container: Arc<dyn Container>) -> Self {
        Self {
            container,
            qualifiers: QualifierRegistry::new(),
            accessors: AccessorCache::new(),
        }
    }

    /// Registers a custom qualifier marker whose extracted tag disambiguates
    /// bindings, alongside the built-in [`crate::marker::Named`].
    pub fn register_qualifier<M, F>(&mut self, extract: F)
    where
        M: Marker,
        F: Fn(&M) -> Box<dyn Tag> + Send + Sync + 'static,
    {
        self.qualifiers.register(extract);
    }

    /// Resolves and writes every marked member of the receiver in metadata
    /// order: own fields, own methods, then the parent chain. Members
    /// already written stay written when a later point fails.
    pub fn inject<T: Reflected>(&self, receiver: &mut T) -> Result<(), InjectError> {
        let accessors =
            self.accessors
                .members_of(T::class_info(), &self.qualifiers, &self.container)?;
        for accessor in accessors.iter() {
            accessor(receiver)?;
        }
        Ok(())
    }

    /// Builds a fresh instance through the designated constructor, then
    /// optionally runs member injection over it.
    pub fn new_instance<T: Reflected>(&self, inject_members: bool) -> Result<T, InjectError> {
        let accessor =
            self.accessors
                .constructor_of(T::class_info(), &self.qualifiers, &self.container)?;
        let instance: Box<dyn Any> = accessor()?;
        let mut instance = *instance
            .downcast::<T>()
            .unwrap_or_else(|_| panic_instance::<T>());
        if inject_members {
            self.inject(&mut instance)?;
        }
        Ok(instance)
    }
}

fn panic_instance<T>() -> ! {
    unreachable!(
        "the constructor accessor should build a `{}`",
        any::type_name::<T>()
    )
}
