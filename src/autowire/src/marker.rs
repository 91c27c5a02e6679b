use std::any::{Any, TypeId};
use std::fmt::Debug;

use crate::binding::Tag;
use crate::util::any::{AsAny, DowncastRef};

/// An annotation value attached to an injection point. Any debuggable,
/// thread-safe value can serve as a marker; the built-in ones below drive
/// the classifier directly.
pub trait Marker: Debug + AsAny + Send + Sync {}

impl<T> Marker for T where T: Debug + Any + Send + Sync {}

/// The built-in qualifier marker, registered at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Named(pub &'static str);

/// Marks a point as optional: a missing binding yields the no-value
/// representation instead of an error.
#[derive(Clone, Copy, Debug)]
pub struct OrNone;

/// Requests erasure: the point's type arguments resolve to their raw keys.
#[derive(Clone, Copy, Debug)]
pub struct Erased;

/// Requests the zero-argument factory shape; the declared type must be a
/// zero-argument function type.
#[derive(Clone, Copy, Debug)]
pub struct ProviderFn;

/// Requests the one-argument factory shape; the declared type must be a
/// one-argument function type.
#[derive(Clone, Copy, Debug)]
pub struct FactoryFn;

pub(crate) fn has_marker<M: Marker>(markers: &[Box<dyn Marker>]) -> bool {
    markers.iter().any(|marker| marker.is::<M>())
}

type ExtractFn = Box<dyn Fn(&dyn Marker) -> Box<dyn Tag> + Send + Sync>;

/// Maps marker kinds to tag extraction functions. Append-only after
/// construction; the first registered qualifier whose marker is present on a
/// point wins.
pub struct QualifierRegistry {
    extractors: Vec<(TypeId, ExtractFn)>,
}

impl QualifierRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            extractors: Vec::new(),
        };
        registry.register(|marker: &Named| Box::new(marker.0) as Box<dyn Tag>);
        registry
    }

    pub fn register<M, F>(&mut self, extract: F)
    where
        M: Marker,
        F: Fn(&M) -> Box<dyn Tag> + Send + Sync + 'static,
    {
        let extract: ExtractFn = Box::new(move |marker| {
            let marker = marker
                .downcast_ref::<M>()
                .unwrap_or_else(|| unreachable!("marker kind should match the extractor"));
            extract(marker)
        });
        self.extractors.push((TypeId::of::<M>(), extract));
    }

    pub fn extract(&self, markers: &[Box<dyn Marker>]) -> Option<Box<dyn Tag>> {
        self.extractors.iter().find_map(|(kind, extract)| {
            markers
                .iter()
                .find(|marker| marker.as_ref().as_any().type_id() == *kind)
                .map(|marker| extract(marker.as_ref()))
        })
    }
}
