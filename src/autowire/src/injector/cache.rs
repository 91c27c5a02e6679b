use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use snafu::prelude::*;

use crate::binding::TypeKey;
use crate::container::Container;
use crate::injector::classify::classify;
use crate::injector::{AmbiguousConstructorSnafu, InjectError, MissingConstructorSnafu};
use crate::marker::QualifierRegistry;
use crate::reflect::{
    Arguments, ClassInfo, ConstructorInfo, FieldInfo, FieldPoint, MethodInfo, ParamInfo, ParamPoint,
};
use crate::wrapper::Binder;

/// A compiled member injector: resolves the member's points and stores or
/// invokes against the receiver.
pub(crate) type MemberAccessor = Arc<dyn Fn(&mut dyn Any) -> Result<(), InjectError> + Send + Sync>;

/// A compiled constructor: resolves the parameter points and builds a fresh
/// instance.
pub(crate) type ConstructorAccessor =
    Arc<dyn Fn() -> Result<Box<dyn Any>, InjectError> + Send + Sync>;

/// Memoizes the classified accessors per class. Classification runs at most
/// a handful of times per class under contention: racing builders each
/// classify against an unlocked container, and the first to publish wins
/// while the rest adopt the published list.
pub(crate) struct AccessorCache {
    members: RwLock<HashMap<TypeKey, Arc<Vec<MemberAccessor>>>>,
    constructors: RwLock<HashMap<TypeKey, ConstructorAccessor>>,
}

impl AccessorCache {
    pub(crate) fn new() -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
            constructors: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn members_of(
        &self,
        info: ClassInfo,
        qualifiers: &QualifierRegistry,
        container: &Arc<dyn Container>,
    ) -> Result<Arc<Vec<MemberAccessor>>, InjectError> {
        let key = info.key();
        if let Some(list) = self.members.read().get(&key) {
            return Ok(Arc::clone(list));
        }
        let list = Arc::new(self.build_members(info, qualifiers, container)?);
        Ok(Arc::clone(self.members.write().entry(key).or_insert(list)))
    }

    pub(crate) fn constructor_of(
        &self,
        info: ClassInfo,
        qualifiers: &QualifierRegistry,
        container: &Arc<dyn Container>,
    ) -> Result<ConstructorAccessor, InjectError> {
        let key = info.key();
        if let Some(accessor) = self.constructors.read().get(&key) {
            return Ok(Arc::clone(accessor));
        }
        let accessor = build_constructor(info, qualifiers, container)?;
        Ok(Arc::clone(
            self.constructors.write().entry(key).or_insert(accessor),
        ))
    }

    /// Compiles the class's own field and method accessors in declaration
    /// order, then splices the parent's cached accessors behind the
    /// projection into the embedded parent value.
    fn build_members(
        &self,
        info: ClassInfo,
        qualifiers: &QualifierRegistry,
        container: &Arc<dyn Container>,
    ) -> Result<Vec<MemberAccessor>, InjectError> {
        let ClassInfo {
            name,
            parent,
            fields,
            methods,
            ..
        } = info;

        let mut accessors = Vec::with_capacity(fields.len() + methods.len());
        for field in fields {
            accessors.push(field_accessor(name, field, qualifiers, container)?);
        }
        for method in methods {
            accessors.push(method_accessor(name, method, qualifiers, container)?);
        }

        if let Some(link) = parent {
            let inherited = self.members_of((link.info)(), qualifiers, container)?;
            for accessor in inherited.iter() {
                let project = Arc::clone(&link.project);
                let inner = Arc::clone(accessor);
                accessors.push(Arc::new(move |receiver: &mut dyn Any| {
                    inner(project(receiver))
                }));
            }
        }

        Ok(accessors)
    }
}

fn field_accessor(
    class: &'static str,
    field: FieldInfo,
    qualifiers: &QualifierRegistry,
    container: &Arc<dyn Container>,
) -> Result<MemberAccessor, InjectError> {
    let binder = classify(&FieldPoint::new(class, &field), qualifiers, container)?;
    Ok(Arc::new(move |receiver| {
        field.write(receiver, binder()?);
        Ok(())
    }))
}

fn method_accessor(
    class: &'static str,
    method: MethodInfo,
    qualifiers: &QualifierRegistry,
    container: &Arc<dyn Container>,
) -> Result<MemberAccessor, InjectError> {
    let binders = param_binders(class, method.name, &method.params, qualifiers, container)?;
    Ok(Arc::new(move |receiver| {
        method.invoke(receiver, resolve_arguments(&binders)?);
        Ok(())
    }))
}

fn build_constructor(
    info: ClassInfo,
    qualifiers: &QualifierRegistry,
    container: &Arc<dyn Container>,
) -> Result<ConstructorAccessor, InjectError> {
    let ClassInfo {
        name, constructors, ..
    } = info;
    let constructor = select_constructor(name, constructors)?;
    let binders = param_binders(
        name,
        constructor.name,
        &constructor.params,
        qualifiers,
        container,
    )?;
    Ok(Arc::new(move || {
        Ok(constructor.construct(resolve_arguments(&binders)?))
    }))
}

/// A single marked constructor is designated regardless of how many others
/// are declared; without a mark, a sole declared constructor is designated
/// implicitly.
fn select_constructor(
    class: &'static str,
    mut constructors: Vec<ConstructorInfo>,
) -> Result<ConstructorInfo, InjectError> {
    ensure!(!constructors.is_empty(), MissingConstructorSnafu { class });
    let marked = constructors
        .iter()
        .filter(|constructor| constructor.marked)
        .count();
    match (marked, constructors.len()) {
        (1, _) => {
            let index = constructors
                .iter()
                .position(|constructor| constructor.marked)
                .unwrap_or_else(|| unreachable!("a marked constructor should be present"));
            Ok(constructors.swap_remove(index))
        }
        (0, 1) => Ok(constructors.swap_remove(0)),
        (0, count) | (count, _) => AmbiguousConstructorSnafu { class, count }.fail(),
    }
}

fn param_binders(
    class: &'static str,
    member: &'static str,
    params: &[ParamInfo],
    qualifiers: &QualifierRegistry,
    container: &Arc<dyn Container>,
) -> Result<Vec<Binder>, InjectError> {
    params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            classify(
                &ParamPoint::new(class, member, index, param),
                qualifiers,
                container,
            )
        })
        .collect()
}

fn resolve_arguments(binders: &[Binder]) -> Result<Arguments, InjectError> {
    let values = binders
        .iter()
        .map(|binder| binder())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Arguments::new(values))
}
