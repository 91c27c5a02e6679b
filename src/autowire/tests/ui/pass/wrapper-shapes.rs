use autowire::prelude::*;

pub struct Raw;

#[derive(Default, Injectable)]
pub struct Plain {
    #[inject]
    value: String,
    untouched: u64,
}

#[derive(Injectable)]
pub struct Qualified {
    #[inject]
    #[named("primary")]
    value: String,
}

#[derive(Injectable)]
pub struct Optional {
    #[inject]
    value: Option<String>,
}

#[derive(Injectable)]
pub struct Erasing {
    #[inject]
    #[erased(Raw)]
    value: String,
}

#[derive(Injectable)]
pub struct Wrapped {
    #[inject]
    provider: ProviderOf<String>,
    #[inject]
    #[provider]
    marked_provider: ProviderOf<String>,
    #[inject]
    factory: FactoryOf<i32, String>,
    #[inject]
    #[factory]
    marked_factory: FactoryOf<i32, String>,
    #[inject]
    lazy: Lazy<String>,
    #[inject]
    #[or_none]
    lazy_optional: Lazy<String>,
    #[inject]
    lazy_provider: Lazy<ProviderOf<String>>,
    #[inject]
    optional_provider: Option<ProviderOf<String>>,
}

#[derive(Injectable)]
pub struct Child {
    #[inject]
    value: i32,
    #[inherits]
    parent: Plain,
}

fn main() {}
