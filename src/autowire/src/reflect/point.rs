use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::binding::TypeDescriptor;
use crate::marker::Marker;
use crate::reflect::{FieldInfo, ParamInfo};

/// One marked location requiring a container-supplied value: a field, or one
/// parameter of a method or constructor. Implemented per member kind so the
/// classifier never branches on the kind itself.
pub trait InjectionPoint {
    fn declared_type(&self) -> &TypeDescriptor;

    fn markers(&self) -> &[Box<dyn Marker>];

    fn location(&self) -> PointLocation;
}

/// Names an injection point for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointLocation {
    class: &'static str,
    member: &'static str,
    parameter: Option<usize>,
}

impl PointLocation {
    pub(crate) fn field(class: &'static str, member: &'static str) -> Self {
        Self {
            class,
            member,
            parameter: None,
        }
    }

    pub(crate) fn parameter(class: &'static str, member: &'static str, index: usize) -> Self {
        Self {
            class,
            member,
            parameter: Some(index),
        }
    }
}

impl Display for PointLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.parameter {
            Some(index) => write!(f, "parameter {} of `{}::{}`", index, self.class, self.member),
            None => write!(f, "field `{}::{}`", self.class, self.member),
        }
    }
}

pub(crate) struct FieldPoint<'a> {
    class: &'static str,
    field: &'a FieldInfo,
}

impl<'a> FieldPoint<'a> {
    pub(crate) fn new(class: &'static str, field: &'a FieldInfo) -> Self {
        Self { class, field }
    }
}

impl InjectionPoint for FieldPoint<'_> {
    fn declared_type(&self) -> &TypeDescriptor {
        &self.field.ty
    }

    fn markers(&self) -> &[Box<dyn Marker>] {
        &self.field.markers
    }

    fn location(&self) -> PointLocation {
        PointLocation::field(self.class, self.field.name)
    }
}

pub(crate) struct ParamPoint<'a> {
    class: &'static str,
    member: &'static str,
    index: usize,
    param: &'a ParamInfo,
}

impl<'a> ParamPoint<'a> {
    pub(crate) fn new(
        class: &'static str,
        member: &'static str,
        index: usize,
        param: &'a ParamInfo,
    ) -> Self {
        Self {
            class,
            member,
            index,
            param,
        }
    }
}

impl InjectionPoint for ParamPoint<'_> {
    fn declared_type(&self) -> &TypeDescriptor {
        &self.param.ty
    }

    fn markers(&self) -> &[Box<dyn Marker>] {
        &self.param.markers
    }

    fn location(&self) -> PointLocation {
        PointLocation::parameter(self.class, self.member, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_location_display_succeeds() {
        let field = PointLocation::field("Widget", "name");
        assert_eq!(field.to_string(), "field `Widget::name`");

        let parameter = PointLocation::parameter("Widget", "new", 1);
        assert_eq!(parameter.to_string(), "parameter 1 of `Widget::new`");
    }
}
