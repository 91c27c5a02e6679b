use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::binding::TypeKey;

/// Runtime description of a possibly generic declared type at an injection
/// point. Wrapper kinds carry the descriptors of their type arguments;
/// [`DescriptorKind::Plain`] carries both the full key and the raw key that
/// erasure falls back to.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    kind: DescriptorKind,
}

#[derive(Clone, Debug)]
pub enum DescriptorKind {
    Plain {
        key: TypeKey,
        raw: TypeKey,
    },
    Wildcard {
        upper: Option<Box<TypeDescriptor>>,
        lower: Option<Box<TypeDescriptor>>,
    },
    Deferred {
        inner: Box<TypeDescriptor>,
    },
    Provider {
        result: Box<TypeDescriptor>,
    },
    Fn0 {
        result: Box<TypeDescriptor>,
    },
    Fn1 {
        argument: Box<TypeDescriptor>,
        result: Box<TypeDescriptor>,
    },
}

impl TypeDescriptor {
    pub fn of<T: ?Sized + 'static>() -> Self {
        let key = TypeKey::of::<T>();
        Self {
            kind: DescriptorKind::Plain { key, raw: key },
        }
    }

    /// A parameterized type whose erasure target differs from the full type.
    /// The raw key is nominated by the metadata author since Rust has no
    /// runtime notion of a raw generic type.
    pub fn parameterized<T: ?Sized + 'static>(raw: TypeKey) -> Self {
        Self {
            kind: DescriptorKind::Plain {
                key: TypeKey::of::<T>(),
                raw,
            },
        }
    }

    pub fn wildcard() -> Self {
        Self {
            kind: DescriptorKind::Wildcard {
                upper: None,
                lower: None,
            },
        }
    }

    pub fn upper_bounded(bound: TypeDescriptor) -> Self {
        Self {
            kind: DescriptorKind::Wildcard {
                upper: Some(Box::new(bound)),
                lower: None,
            },
        }
    }

    pub fn lower_bounded(bound: TypeDescriptor) -> Self {
        Self {
            kind: DescriptorKind::Wildcard {
                upper: None,
                lower: Some(Box::new(bound)),
            },
        }
    }

    pub fn deferred(inner: TypeDescriptor) -> Self {
        Self {
            kind: DescriptorKind::Deferred {
                inner: Box::new(inner),
            },
        }
    }

    pub fn provider_of(result: TypeDescriptor) -> Self {
        Self {
            kind: DescriptorKind::Provider {
                result: Box::new(result),
            },
        }
    }

    pub fn fn0(result: TypeDescriptor) -> Self {
        Self {
            kind: DescriptorKind::Fn0 {
                result: Box::new(result),
            },
        }
    }

    pub fn fn1(argument: TypeDescriptor, result: TypeDescriptor) -> Self {
        Self {
            kind: DescriptorKind::Fn1 {
                argument: Box::new(argument),
                result: Box::new(result),
            },
        }
    }

    pub fn kind(&self) -> &DescriptorKind {
        &self.kind
    }

    /// Concretizes the descriptor into a lookup key. A wildcard resolves to
    /// its upper bound, or to [`TypeKey::any`] when unbounded; otherwise the
    /// raw key is returned under erasure and the full key else.
    ///
    /// The classifier unwraps wrapper kinds before resolving, so only plain
    /// and wildcard descriptors ever reach this point.
    pub fn resolve(&self, erase: bool) -> TypeKey {
        match &self.kind {
            DescriptorKind::Plain { key, raw } => {
                if erase {
                    *raw
                } else {
                    *key
                }
            }
            DescriptorKind::Wildcard { upper, .. } => upper
                .as_deref()
                .map(|bound| bound.resolve(erase))
                .unwrap_or_else(TypeKey::any),
            _ => unreachable!("wrapper descriptors should be unwrapped before resolution"),
        }
    }

    /// The mirror case of [`TypeDescriptor::resolve`] used for consumed
    /// argument types: a wildcard resolves to its lower bound when one
    /// exists.
    pub fn resolve_lower(&self) -> TypeKey {
        match &self.kind {
            DescriptorKind::Wildcard {
                lower: Some(bound), ..
            } => bound.resolve(false),
            _ => self.resolve(false),
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.kind {
            DescriptorKind::Plain { key, .. } => Display::fmt(key, f),
            DescriptorKind::Wildcard { upper, lower } => match (upper, lower) {
                (Some(upper), _) => write!(f, "impl {upper}"),
                (None, Some(lower)) => write!(f, "in {lower}"),
                (None, None) => f.write_str("_"),
            },
            DescriptorKind::Deferred { inner } => write!(f, "Lazy<{inner}>"),
            DescriptorKind::Provider { result } => write!(f, "ProviderOf<{result}>"),
            DescriptorKind::Fn0 { result } => write!(f, "fn() -> {result}"),
            DescriptorKind::Fn1 { argument, result } => write!(f, "fn({argument}) -> {result}"),
        }
    }
}
