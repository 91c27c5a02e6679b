mod point;

use std::any::{self, Any};
use std::sync::Arc;

use crate::binding::{TypeDescriptor, TypeKey};
use crate::marker::Marker;
use crate::wrapper::Resolved;

pub use point::{InjectionPoint, PointLocation};

pub(crate) use point::{FieldPoint, ParamPoint};

/// A class which can describe its own injection metadata. Usually generated
/// by `#[derive(Injectable)]`; hand-written via the [`ClassInfo`] builders
/// for shapes the derive does not cover (setter methods, explicit
/// constructors, wildcard descriptors).
pub trait Reflected: Any + Sized {
    fn class_info() -> ClassInfo;
}

/// Per-class injection metadata: the marked fields and methods, the declared
/// constructors, and an optional parent link for merged hierarchy traversal.
pub struct ClassInfo {
    pub(crate) key: TypeKey,
    pub(crate) name: &'static str,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) fields: Vec<FieldInfo>,
    pub(crate) methods: Vec<MethodInfo>,
    pub(crate) constructors: Vec<ConstructorInfo>,
}

impl ClassInfo {
    pub fn new<T: Any>(name: &'static str) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            name,
            parent: None,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Links the parent class whose accessors are spliced after this class's
    /// own. `project` maps a receiver to its embedded parent value, the
    /// composition stand-in for class inheritance.
    pub fn with_parent<C, P>(mut self, project: fn(&mut C) -> &mut P) -> Self
    where
        C: Any,
        P: Reflected,
    {
        self.parent = Some(ParentLink {
            info: P::class_info,
            project: Arc::new(move |receiver| {
                let receiver = receiver
                    .downcast_mut::<C>()
                    .unwrap_or_else(|| panic_receiver::<C>());
                project(receiver)
            }),
        });
        self
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorInfo) -> Self {
        self.constructors.push(constructor);
        self
    }
}

pub(crate) struct ParentLink {
    pub(crate) info: fn() -> ClassInfo,
    pub(crate) project: Arc<dyn Fn(&mut dyn Any) -> &mut (dyn Any) + Send + Sync>,
}

fn panic_receiver<C>() -> ! {
    unreachable!("the receiver should be a `{}`", any::type_name::<C>())
}

/// A marked field: its declared type, its markers, and the monomorphic
/// writer that stores a resolved value into the receiver.
pub struct FieldInfo {
    pub(crate) name: &'static str,
    pub(crate) ty: TypeDescriptor,
    pub(crate) markers: Vec<Box<dyn Marker>>,
    write: Box<dyn Fn(&mut dyn Any, Resolved) + Send + Sync>,
}

impl FieldInfo {
    pub fn of<C, F>(
        name: &'static str,
        ty: TypeDescriptor,
        markers: Vec<Box<dyn Marker>>,
        write: F,
    ) -> Self
    where
        C: Any,
        F: Fn(&mut C, Resolved) + Send + Sync + 'static,
    {
        Self {
            name,
            ty,
            markers,
            write: Box::new(move |receiver, resolved| {
                let receiver = receiver
                    .downcast_mut::<C>()
                    .unwrap_or_else(|| panic_receiver::<C>());
                write(receiver, resolved);
            }),
        }
    }

    pub(crate) fn write(&self, receiver: &mut dyn Any, resolved: Resolved) {
        (self.write)(receiver, resolved);
    }
}

/// A marked method: one injection point per parameter, invoked with all
/// parameters resolved.
pub struct MethodInfo {
    pub(crate) name: &'static str,
    pub(crate) params: Vec<ParamInfo>,
    invoke: Box<dyn Fn(&mut dyn Any, Arguments) + Send + Sync>,
}

impl MethodInfo {
    pub fn of<C, F>(name: &'static str, params: Vec<ParamInfo>, invoke: F) -> Self
    where
        C: Any,
        F: Fn(&mut C, Arguments) + Send + Sync + 'static,
    {
        Self {
            name,
            params,
            invoke: Box::new(move |receiver, arguments| {
                let receiver = receiver
                    .downcast_mut::<C>()
                    .unwrap_or_else(|| panic_receiver::<C>());
                invoke(receiver, arguments);
            }),
        }
    }

    pub(crate) fn invoke(&self, receiver: &mut dyn Any, arguments: Arguments) {
        (self.invoke)(receiver, arguments);
    }
}

/// A declared constructor: one injection point per parameter, producing a
/// new instance once all parameters are resolved.
pub struct ConstructorInfo {
    pub(crate) name: &'static str,
    pub(crate) marked: bool,
    pub(crate) params: Vec<ParamInfo>,
    construct: Box<dyn Fn(Arguments) -> Box<dyn Any> + Send + Sync>,
}

impl ConstructorInfo {
    pub fn of<C, F>(name: &'static str, params: Vec<ParamInfo>, construct: F) -> Self
    where
        C: Any,
        F: Fn(Arguments) -> C + Send + Sync + 'static,
    {
        Self {
            name,
            marked: false,
            params,
            construct: Box::new(move |arguments| Box::new(construct(arguments))),
        }
    }

    /// Marks this constructor as the designated injection constructor.
    pub fn marked(mut self) -> Self {
        self.marked = true;
        self
    }

    pub(crate) fn construct(&self, arguments: Arguments) -> Box<dyn Any> {
        (self.construct)(arguments)
    }
}

/// One injection point of a method or constructor parameter list.
pub struct ParamInfo {
    pub(crate) ty: TypeDescriptor,
    pub(crate) markers: Vec<Box<dyn Marker>>,
}

impl ParamInfo {
    pub fn new(ty: TypeDescriptor, markers: Vec<Box<dyn Marker>>) -> Self {
        Self { ty, markers }
    }
}

/// The resolved argument list handed to a method or constructor closure, in
/// parameter order. The driver passes exactly as many values as the point
/// list declares.
pub struct Arguments {
    inner: std::vec::IntoIter<Resolved>,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Resolved>) -> Self {
        Self {
            inner: values.into_iter(),
        }
    }

    pub fn take(&mut self) -> Resolved {
        self.inner
            .next()
            .unwrap_or_else(|| unreachable!("the argument count should match the parameter list"))
    }
}
