use std::sync::Arc;

use crate::binding::{DescriptorKind, Tag, TypeBinding, TypeDescriptor};
use crate::container::Container;
use crate::injector::{FactoryShapeSnafu, InjectError, ProviderShapeSnafu};
use crate::marker::{has_marker, Erased, FactoryFn, Marker, OrNone, ProviderFn, QualifierRegistry};
use crate::reflect::{InjectionPoint, PointLocation};
use crate::wrapper::{Binder, DeferredCell, Resolved};

/// Decides which wrapper shape an injection point wants and compiles it to a
/// lookup closure bound to the container. Evaluated once per point; the
/// cache layer owns memoization.
///
/// Dispatch is ordered and the first match wins: a deferred wrapper is
/// unwrapped before anything else since it may wrap any of the other shapes,
/// then the function-shape markers (whose declared-type mismatch is a
/// configuration error), then the provider wrapper and bare function types,
/// and finally the plain instance default.
pub(crate) fn classify(
    point: &dyn InjectionPoint,
    qualifiers: &QualifierRegistry,
    container: &Arc<dyn Container>,
) -> Result<Binder, InjectError> {
    let tag = qualifiers.extract(point.markers());
    let erase = has_marker::<Erased>(point.markers());
    let optional = has_marker::<OrNone>(point.markers());

    if let DescriptorKind::Deferred { inner } = point.declared_type().kind() {
        let synthetic = SyntheticPoint {
            ty: inner.as_ref(),
            origin: point,
        };
        let binder = classify(&synthetic, qualifiers, container)?;
        return Ok(Arc::new(move || {
            Ok(Resolved::Deferred(DeferredCell::new(Arc::clone(&binder))))
        }));
    }

    if has_marker::<ProviderFn>(point.markers()) {
        let DescriptorKind::Fn0 { result } = point.declared_type().kind() else {
            return ProviderShapeSnafu {
                point: point.location(),
            }
            .fail();
        };
        return Ok(provider_binder(result, tag, erase, optional, container));
    }

    if let DescriptorKind::Provider { result } = point.declared_type().kind() {
        return Ok(provider_binder(result, tag, erase, optional, container));
    }

    if has_marker::<FactoryFn>(point.markers()) {
        let DescriptorKind::Fn1 { argument, result } = point.declared_type().kind() else {
            return FactoryShapeSnafu {
                point: point.location(),
            }
            .fail();
        };
        return Ok(factory_binder(
            argument, result, tag, erase, optional, container,
        ));
    }

    match point.declared_type().kind() {
        DescriptorKind::Fn0 { result } => Ok(provider_binder(result, tag, erase, optional, container)),
        DescriptorKind::Fn1 { argument, result } => Ok(factory_binder(
            argument, result, tag, erase, optional, container,
        )),
        _ => Ok(instance_binder(
            point.declared_type(),
            tag,
            erase,
            optional,
            container,
        )),
    }
}

fn instance_binder(
    ty: &TypeDescriptor,
    tag: Option<Box<dyn Tag>>,
    erase: bool,
    optional: bool,
    container: &Arc<dyn Container>,
) -> Binder {
    let binding = TypeBinding::new(ty.resolve(erase), tag);
    let container = Arc::clone(container);
    if optional {
        Arc::new(move || {
            Ok(match container.instance_or_none(&binding)? {
                Some(value) => Resolved::Instance(value),
                None => Resolved::Absent,
            })
        })
    } else {
        Arc::new(move || Ok(Resolved::Instance(container.instance(&binding)?)))
    }
}

fn provider_binder(
    result: &TypeDescriptor,
    tag: Option<Box<dyn Tag>>,
    erase: bool,
    optional: bool,
    container: &Arc<dyn Container>,
) -> Binder {
    let binding = TypeBinding::new(result.resolve(erase), tag);
    let container = Arc::clone(container);
    if optional {
        Arc::new(move || {
            Ok(match container.provider_or_none(&binding)? {
                Some(handle) => Resolved::Provider(handle),
                None => Resolved::Absent,
            })
        })
    } else {
        Arc::new(move || Ok(Resolved::Provider(container.provider(&binding)?)))
    }
}

fn factory_binder(
    argument: &TypeDescriptor,
    result: &TypeDescriptor,
    tag: Option<Box<dyn Tag>>,
    erase: bool,
    optional: bool,
    container: &Arc<dyn Container>,
) -> Binder {
    // Consumed argument types resolve through their lower bound, the mirror
    // case of the upper-bound rule for produced result types.
    let argument = argument.resolve_lower();
    let binding = TypeBinding::new(result.resolve(erase), tag);
    let container = Arc::clone(container);
    if optional {
        Arc::new(move || {
            Ok(match container.factory_or_none(argument, &binding)? {
                Some(handle) => Resolved::Factory(handle),
                None => Resolved::Absent,
            })
        })
    } else {
        Arc::new(move || Ok(Resolved::Factory(container.factory(argument, &binding)?)))
    }
}

/// The inner point synthesized when unwrapping a deferred wrapper: the
/// unwrapped type with the origin's markers, so tag, optionality and erasure
/// propagate.
struct SyntheticPoint<'a> {
    ty: &'a TypeDescriptor,
    origin: &'a dyn InjectionPoint,
}

impl InjectionPoint for SyntheticPoint<'_> {
    fn declared_type(&self) -> &TypeDescriptor {
        self.ty
    }

    fn markers(&self) -> &[Box<dyn Marker>] {
        self.origin.markers()
    }

    fn location(&self) -> PointLocation {
        self.origin.location()
    }
}
