use std::any::Any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::container::{FactoryHandle, ProviderHandle, ResolveError};

/// A compiled lookup closure bound to the container. Invoking it performs
/// the resolution a classified point asks for.
pub(crate) type Binder = Arc<dyn Fn() -> Result<Resolved, ResolveError> + Send + Sync>;

/// The outcome of invoking an accessor's lookup closure, consumed by the
/// monomorphic member writers which know the concrete declared type.
pub enum Resolved {
    /// A plain instance value.
    Instance(Box<dyn Any>),
    /// The no-value representation of an optional point with no binding.
    Absent,
    /// A zero-argument getter from the container.
    Provider(ProviderHandle),
    /// A one-argument getter from the container.
    Factory(FactoryHandle),
    /// A deferred resolution; no container call has happened yet.
    Deferred(DeferredCell),
}

impl Resolved {
    pub fn into_value<T: Any>(self) -> T {
        match self {
            Self::Instance(value) => downcast_value(value),
            _ => unreachable!("a required instance point should resolve to a value"),
        }
    }

    pub fn into_option<T: Any>(self) -> Option<T> {
        match self {
            Self::Instance(value) => Some(downcast_value(value)),
            Self::Absent => None,
            _ => unreachable!("an instance point should resolve to a value or nothing"),
        }
    }

    pub fn into_provider<T: Any>(self) -> ProviderOf<T> {
        self.into_provider_or_none()
            .unwrap_or_else(|| unreachable!("a required provider point should resolve to a handle"))
    }

    pub fn into_provider_or_none<T: Any>(self) -> Option<ProviderOf<T>> {
        match self {
            Self::Provider(handle) => Some(ProviderOf::new(handle)),
            Self::Absent => None,
            _ => unreachable!("a provider point should resolve to a handle or nothing"),
        }
    }

    pub fn into_factory<A: Any, T: Any>(self) -> FactoryOf<A, T> {
        self.into_factory_or_none()
            .unwrap_or_else(|| unreachable!("a required factory point should resolve to a handle"))
    }

    pub fn into_factory_or_none<A: Any, T: Any>(self) -> Option<FactoryOf<A, T>> {
        match self {
            Self::Factory(handle) => Some(FactoryOf::new(handle)),
            Self::Absent => None,
            _ => unreachable!("a factory point should resolve to a handle or nothing"),
        }
    }

    pub fn into_deferred(self) -> DeferredCell {
        match self {
            Self::Deferred(cell) => cell,
            _ => unreachable!("a deferred point should resolve to a deferred cell"),
        }
    }

    /// Shorthand for the common case of a deferred plain instance.
    pub fn into_lazy<T: Any>(self) -> Lazy<T> {
        Lazy::new(self.into_deferred(), Resolved::into_option::<T>)
    }
}

fn downcast_value<T: Any>(value: Box<dyn Any>) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => unreachable!("the container should return a value of the binding's type"),
    }
}

/// The erased deferred thunk behind [`Lazy`]. Invoking it runs the inner
/// point's lookup; the cell itself performs no memoization.
#[derive(Clone)]
pub struct DeferredCell {
    binder: Binder,
}

impl DeferredCell {
    pub(crate) fn new(binder: Binder) -> Self {
        Self { binder }
    }

    pub fn invoke(&self) -> Result<Resolved, ResolveError> {
        (self.binder)()
    }
}

impl Debug for DeferredCell {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DeferredCell").finish_non_exhaustive()
    }
}

enum LazyState<T> {
    Pending {
        cell: DeferredCell,
        convert: fn(Resolved) -> Option<T>,
    },
    Ready(Option<T>),
}

/// A single-initialization memoizing handle: the first access resolves and
/// stores the value, subsequent accesses return the stored result. A
/// resolution error is returned to the caller and not memoized. `None` is
/// the no-value representation of an optional point with no binding.
pub struct Lazy<T> {
    state: Mutex<LazyState<T>>,
}

impl<T: Any> Lazy<T> {
    pub fn new(cell: DeferredCell, convert: fn(Resolved) -> Option<T>) -> Self {
        Self {
            state: Mutex::new(LazyState::Pending { cell, convert }),
        }
    }

    pub fn get(&self) -> Result<MappedMutexGuard<'_, Option<T>>, ResolveError> {
        let mut state = self.state.lock();
        if let LazyState::Pending { cell, convert } = &*state {
            let value = (convert)(cell.invoke()?);
            *state = LazyState::Ready(value);
        }
        Ok(MutexGuard::map(state, |state| match state {
            LazyState::Ready(value) => value,
            LazyState::Pending { .. } => unreachable!("the cell should be resolved above"),
        }))
    }
}

impl<T> Debug for Lazy<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Lazy").finish_non_exhaustive()
    }
}

/// The externally-expected provider-object protocol: a single no-argument
/// call method over the container's native getter. Resolves on every call,
/// no memoization.
pub struct ProviderOf<T> {
    handle: ProviderHandle,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any> ProviderOf<T> {
    pub fn new(handle: ProviderHandle) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> Result<T, ResolveError> {
        (self.handle)().map(downcast_value)
    }
}

impl<T> Debug for ProviderOf<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ProviderOf").finish_non_exhaustive()
    }
}

/// The one-argument factory protocol over the container's native getter.
pub struct FactoryOf<A, T> {
    handle: FactoryHandle,
    _marker: PhantomData<fn(A) -> T>,
}

impl<A: Any, T: Any> FactoryOf<A, T> {
    pub fn new(handle: FactoryHandle) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }

    pub fn call(&self, argument: A) -> Result<T, ResolveError> {
        (self.handle)(Box::new(argument)).map(downcast_value)
    }
}

impl<A, T> Debug for FactoryOf<A, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FactoryOf").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::binding::TypeBinding;

    use super::*;

    #[test]
    fn lazy_get_resolves_once_and_memoizes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let binder: Binder = Arc::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(Resolved::Instance(Box::new(7i32)))
        });
        let lazy: Lazy<i32> = Lazy::new(DeferredCell::new(binder), Resolved::into_option::<i32>);

        assert_eq!(*lazy.get().unwrap(), Some(7));
        assert_eq!(*lazy.get().unwrap(), Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lazy_get_does_not_memoize_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let binder: Binder = Arc::new(move || {
            let attempt = counted.fetch_add(1, Ordering::SeqCst);
            if attempt == 0 {
                Err(ResolveError::NotFound {
                    binding: TypeBinding::of::<i32>(),
                })
            } else {
                Ok(Resolved::Instance(Box::new(7i32)))
            }
        });
        let lazy: Lazy<i32> = Lazy::new(DeferredCell::new(binder), Resolved::into_option::<i32>);

        assert!(lazy.get().is_err());
        assert_eq!(*lazy.get().unwrap(), Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn lazy_get_returns_none_when_point_is_absent() {
        let binder: Binder = Arc::new(|| Ok(Resolved::Absent));
        let lazy: Lazy<i32> = Lazy::new(DeferredCell::new(binder), Resolved::into_option::<i32>);

        assert_eq!(*lazy.get().unwrap(), None);
    }

    #[test]
    fn provider_of_resolves_on_every_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let handle: ProviderHandle = Box::new(move || {
            let n = counted.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(n))
        });
        let provider: ProviderOf<usize> = ProviderOf::new(handle);

        assert_eq!(provider.get().unwrap(), 0);
        assert_eq!(provider.get().unwrap(), 1);
    }

    #[test]
    fn factory_of_forwards_its_argument() {
        let handle: FactoryHandle = Box::new(|argument| {
            let n = argument
                .downcast::<i32>()
                .unwrap_or_else(|_| unreachable!("the argument should be an `i32`"));
            Ok(Box::new(n.to_string()))
        });
        let factory: FactoryOf<i32, String> = FactoryOf::new(handle);

        assert_eq!(factory.call(42).unwrap(), "42");
    }

    #[test]
    fn resolved_into_option_succeeds_when_absent() {
        assert_eq!(Resolved::Absent.into_option::<i32>(), None);
        assert_eq!(
            Resolved::Instance(Box::new(1i32)).into_option::<i32>(),
            Some(1)
        );
    }
}
