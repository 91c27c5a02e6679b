use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use autowire::prelude::*;

fn main() {
    let mut container = StaticContainer::new();
    container.bind(
        TypeBinding::tagged::<&'static str>("app_name"),
        "greeter",
    );
    container.bind(
        TypeBinding::of::<Arc<dyn Greeter>>(),
        Arc::new(EnglishGreeter) as Arc<dyn Greeter>,
    );

    let injector = Injector::new(Arc::new(container));
    let app: App = injector.new_instance(false).unwrap();
    app.run();
}

#[derive(Injectable)]
struct App {
    #[inject]
    #[named("app_name")]
    name: &'static str,
    #[inject]
    greeter: Arc<dyn Greeter>,
}

impl App {
    fn run(&self) {
        println!("[{}] {}", self.name, self.greeter.greet("world"));
    }
}

trait Greeter: Send + Sync + 'static {
    fn greet(&self, name: &str) -> String;
}

struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self, name: &str) -> String {
        format!("Hello, {name}!")
    }
}

/// A minimal container over pre-bound cloneable values.
struct StaticContainer {
    values: HashMap<TypeBinding, Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>>,
}

impl StaticContainer {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    fn bind<T: Any + Clone + Send + Sync>(&mut self, binding: TypeBinding, value: T) {
        self.values
            .insert(binding, Arc::new(move || Box::new(value.clone())));
    }

    fn not_found(binding: &TypeBinding) -> ResolveError {
        ResolveError::NotFound {
            binding: binding.clone(),
        }
    }
}

impl Container for StaticContainer {
    fn instance(&self, binding: &TypeBinding) -> Result<Box<dyn Any>, ResolveError> {
        self.instance_or_none(binding)?
            .ok_or_else(|| Self::not_found(binding))
    }

    fn instance_or_none(
        &self,
        binding: &TypeBinding,
    ) -> Result<Option<Box<dyn Any>>, ResolveError> {
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
        _argument: TypeKey,
        binding: &TypeBinding,
    ) -> Result<FactoryHandle, ResolveError> {
        Err(Self::not_found(binding))
    }

    fn factory_or_none(
        &self,
        _argument: TypeKey,
        _binding: &TypeBinding,
    ) -> Result<Option<FactoryHandle>, ResolveError> {
        Ok(None)
    }
}
