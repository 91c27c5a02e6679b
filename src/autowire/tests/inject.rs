use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use autowire::prelude::*;

type Make = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;
type MakeWith = Arc<dyn Fn(Box<dyn Any>) -> Box<dyn Any> + Send + Sync>;

/// A map-backed container: each binding holds a closure producing a fresh
/// value, factories are keyed by argument type and result binding.
struct FixtureContainer {
    values: HashMap<TypeBinding, Make>,
    factories: HashMap<(TypeKey, TypeBinding), MakeWith>,
    lookups: AtomicUsize,
}

impl FixtureContainer {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            factories: HashMap::new(),
            lookups: AtomicUsize::new(0),
        }
    }

    fn bind<T: Any + Clone + Send + Sync>(&mut self, binding: TypeBinding, value: T) {
        self.values
            .insert(binding, Arc::new(move || Box::new(value.clone())));
    }

    fn bind_factory<A, T, F>(&mut self, binding: TypeBinding, make: F)
    where
        A: Any,
        T: Any,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.factories.insert(
            (TypeKey::of::<A>(), binding),
            Arc::new(move |argument| {
                let argument = argument
                    .downcast::<A>()
                    .unwrap_or_else(|_| panic!("unexpected factory argument type"));
                Box::new(make(*argument))
            }),
        );
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn not_found(binding: &TypeBinding) -> ResolveError {
        ResolveError::NotFound {
            binding: binding.clone(),
        }
    }
}

impl Container for FixtureContainer {
    fn instance(&self, binding: &TypeBinding) -> Result<Box<dyn Any>, ResolveError> {
        self.instance_or_none(binding)?
            .ok_or_else(|| Self::not_found(binding))
    }

    fn instance_or_none(
        &self,
        binding: &TypeBinding,
    ) -> Result<Option<Box<dyn Any>>, ResolveError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.values.get(binding).map(|make| make()))
    }

    fn provider(&self, binding: &TypeBinding) -> Result<ProviderHandle, ResolveError> {
        self.provider_or_none(binding)?
            .ok_or_else(|| Self::not_found(binding))
    }

    fn provider_or_none(
        &self,
        binding: &TypeBinding,
    ) -> Result<Option<ProviderHandle>, ResolveError> {
        Ok(self.values.get(binding).cloned().map(|make| {
            Box::new(move || Ok(make())) as ProviderHandle
        }))
    }

    fn factory(
        &self,
        argument: TypeKey,
        binding: &TypeBinding,
    ) -> Result<FactoryHandle, ResolveError> {
        self.factory_or_none(argument, binding)?
            .ok_or_else(|| Self::not_found(binding))
    }

    fn factory_or_none(
        &self,
        argument: TypeKey,
        binding: &TypeBinding,
    ) -> Result<Option<FactoryHandle>, ResolveError> {
        Ok(self
            .factories
            .get(&(argument, binding.clone()))
            .cloned()
            .map(|make| Box::new(move |argument| Ok(make(argument))) as FactoryHandle))
    }
}

fn wired_injector() -> Injector {
    let mut container = FixtureContainer::new();
    container.bind(TypeBinding::of::<String>(), String::from("plain"));
    container.bind(TypeBinding::tagged::<String>("gear"), String::from("overdrive"));
    container.bind(TypeBinding::of::<i32>(), 7i32);
    container.bind_factory(TypeBinding::of::<String>(), |n: i32| format!("exhaust-{n}"));
    Injector::new(Arc::new(container))
}

#[derive(Injectable)]
struct Engine {
    #[inject]
    #[named("gear")]
    gear: String,
    #[inject]
    rpm: i32,
    #[inject]
    boost: Option<f64>,
    #[inject]
    horn: ProviderOf<String>,
    #[inject]
    #[provider]
    igniter: ProviderOf<i32>,
    #[inject]
    exhaust: FactoryOf<i32, String>,
    #[inject]
    spark: Lazy<i32>,
    serial: u32,
}

#[test]
fn new_instance_resolves_every_wrapper_shape() {
    let injector = wired_injector();

    let engine: Engine = injector.new_instance(false).unwrap();
    assert_eq!(engine.gear, "overdrive");
    assert_eq!(engine.rpm, 7);
    assert_eq!(engine.boost, None);
    assert_eq!(engine.horn.get().unwrap(), "plain");
    assert_eq!(engine.igniter.get().unwrap(), 7);
    assert_eq!(engine.exhaust.call(3).unwrap(), "exhaust-3");
    assert_eq!(*engine.spark.get().unwrap(), Some(7));
    assert_eq!(engine.serial, 0);
}

#[derive(Default, Injectable)]
struct Panel {
    #[inject]
    label: String,
    #[inject]
    brightness: Option<f64>,
    width: u32,
}

#[test]
fn inject_writes_members_and_leaves_the_rest_alone() {
    let injector = wired_injector();

    let mut panel = Panel {
        width: 4,
        ..Panel::default()
    };
    injector.inject(&mut panel).unwrap();
    assert_eq!(panel.label, "plain");
    assert_eq!(panel.brightness, None);
    assert_eq!(panel.width, 4);
}

#[test]
fn inject_fails_when_a_required_binding_is_missing() {
    #[derive(Default, Injectable)]
    struct Broken {
        #[inject]
        missing: bool,
    }

    let injector = wired_injector();

    let mut broken = Broken::default();
    let err = injector.inject(&mut broken).unwrap_err();
    assert!(matches!(
        err,
        InjectError::Resolution {
            source: ResolveError::NotFound { .. }
        }
    ));
}

struct Gauge;

#[derive(Default, Injectable)]
struct Dial {
    #[inject]
    #[erased(Gauge)]
    reading: i32,
}

#[test]
fn inject_resolves_an_erased_point_through_its_raw_key() {
    let mut container = FixtureContainer::new();
    container.bind(TypeBinding::new(TypeKey::of::<Gauge>(), None), 99i32);
    let injector = Injector::new(Arc::new(container));

    let mut dial = Dial::default();
    injector.inject(&mut dial).unwrap();
    assert_eq!(dial.reading, 99);
}

#[derive(Default, Injectable)]
struct Base {
    #[inject]
    label: String,
}

#[derive(Default, Injectable)]
struct Sub {
    #[inject]
    rpm: i32,
    #[inherits]
    base: Base,
}

#[test]
fn inject_walks_the_parent_link() {
    let injector = wired_injector();

    let mut sub = Sub::default();
    injector.inject(&mut sub).unwrap();
    assert_eq!(sub.rpm, 7);
    assert_eq!(sub.base.label, "plain");
}

#[test]
fn lazy_points_resolve_on_first_access_only() {
    #[derive(Injectable)]
    struct Sleeper {
        #[inject]
        spark: Lazy<i32>,
    }

    let mut container = FixtureContainer::new();
    container.bind(TypeBinding::of::<i32>(), 7i32);
    let container = Arc::new(container);
    let injector = Injector::new(Arc::clone(&container) as Arc<dyn Container>);

    let sleeper: Sleeper = injector.new_instance(false).unwrap();
    assert_eq!(container.lookups(), 0);
    assert_eq!(*sleeper.spark.get().unwrap(), Some(7));
    assert_eq!(*sleeper.spark.get().unwrap(), Some(7));
    assert_eq!(container.lookups(), 1);
}

#[test]
fn optional_lazy_points_yield_none_on_first_access() {
    #[derive(Injectable)]
    struct Maybe {
        #[inject]
        #[or_none]
        boost: Lazy<f64>,
    }

    let injector = wired_injector();

    let maybe: Maybe = injector.new_instance(false).unwrap();
    assert_eq!(*maybe.boost.get().unwrap(), None);
}
