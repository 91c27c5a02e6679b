#![allow(clippy::new_without_default)]

pub mod binding;
pub mod container;
pub mod injector;
pub mod marker;
pub mod reflect;
pub mod wrapper;

mod util;

pub use autowire_derive::Injectable;

pub mod prelude {
    pub use crate::binding::{Tag, TypeBinding, TypeDescriptor, TypeKey};
    pub use crate::container::{Container, FactoryHandle, ProviderHandle, ResolveError};
    pub use crate::injector::{InjectError, Injector};
    pub use crate::marker::{Erased, FactoryFn, Marker, Named, OrNone, ProviderFn};
    pub use crate::reflect::{ClassInfo, Reflected};
    pub use crate::wrapper::{FactoryOf, Lazy, ProviderOf};
    pub use crate::Injectable;
}
