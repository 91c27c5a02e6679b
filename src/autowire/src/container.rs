use std::any::Any;
use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::binding::{TypeBinding, TypeKey};

/// A reusable no-argument getter handed out by the container. Each call
/// performs a fresh resolution.
pub type ProviderHandle = Box<dyn Fn() -> Result<Box<dyn Any>, ResolveError> + Send + Sync>;

/// A reusable one-argument getter handed out by the container.
pub type FactoryHandle =
    Box<dyn Fn(Box<dyn Any>) -> Result<Box<dyn Any>, ResolveError> + Send + Sync>;

/// The retrieval contract consumed from the backing dependency container,
/// keyed by a resolved [`TypeBinding`]. Binding storage, scoping and cycle
/// detection are the container's responsibility; this crate only requests
/// values.
///
/// The non-`or_none` verbs fail with a [`ResolveError`] when no matching
/// binding exists; the `or_none` verbs return `None` instead. A value
/// returned for a binding must be of the binding's target type.
#[cfg_attr(test, mockall::automock)]
pub trait Container: Send + Sync {
    fn instance(&self, binding: &TypeBinding) -> Result<Box<dyn Any>, ResolveError>;

    fn instance_or_none(&self, binding: &TypeBinding)
        -> Result<Option<Box<dyn Any>>, ResolveError>;

    fn provider(&self, binding: &TypeBinding) -> Result<ProviderHandle, ResolveError>;

    fn provider_or_none(&self, binding: &TypeBinding)
        -> Result<Option<ProviderHandle>, ResolveError>;

    fn factory(
        &self,
        argument: TypeKey,
        binding: &TypeBinding,
    ) -> Result<FactoryHandle, ResolveError>;

    fn factory_or_none(
        &self,
        argument: TypeKey,
        binding: &TypeBinding,
    ) -> Result<Option<FactoryHandle>, ResolveError>;
}

/// Errors raised by the container during resolution. They propagate through
/// accessor closures unchanged; this crate adds no wrapping or translation.
#[derive(Clone, Debug, Snafu)]
#[non_exhaustive]
pub enum ResolveError {
    #[snafu(display("could not find a binding for {binding}"))]
    NotFound { binding: TypeBinding },
    #[snafu(display("could not construct {binding} which depends on itself somehow"))]
    CyclicDependency { binding: TypeBinding },
    #[snafu(display("could not construct a value for {binding}"))]
    Construction {
        binding: TypeBinding,
        source: Arc<dyn Error + Send + Sync>,
    },
}
