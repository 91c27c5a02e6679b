use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, Error as SynError, LitStr, Meta, Result as SynResult, Type};

#[derive(Default)]
pub struct FieldAttributes {
    pub inject: bool,
    pub inherits: bool,
    pub named: Option<LitStr>,
    pub or_none: bool,
    pub erased: bool,
    pub raw: Option<Type>,
    pub provider: bool,
    pub factory: bool,
}

impl FieldAttributes {
    fn has_helpers(&self) -> bool {
        self.named.is_some() || self.or_none || self.erased || self.provider || self.factory
    }
}

pub fn parse_field_attributes(attrs: &[Attribute]) -> SynResult<FieldAttributes> {
    let mut parsed = FieldAttributes::default();

    for attr in attrs {
        let Some(ident) = attr.path().get_ident().map(ToString::to_string) else {
            continue;
        };
        match (ident.as_str(), &attr.meta) {
            ("inject", Meta::Path(_)) => parsed.inject = true,
            ("inherits", Meta::Path(_)) => parsed.inherits = true,
            ("or_none", Meta::Path(_)) => parsed.or_none = true,
            ("provider", Meta::Path(_)) => parsed.provider = true,
            ("factory", Meta::Path(_)) => parsed.factory = true,
            ("erased", Meta::Path(_)) => parsed.erased = true,
            ("erased", Meta::List(_)) => {
                parsed.erased = true;
                parsed.raw = Some(attr.parse_args::<Type>()?);
            }
            ("named", Meta::List(_)) => parsed.named = Some(attr.parse_args::<LitStr>()?),
            ("named", _) => {
                return Err(SynError::new(
                    attr.span(),
                    "expects `#[named(\"...\")]` to receive a string literal",
                ))
            }
            ("inject" | "inherits" | "or_none" | "provider" | "factory", _) => {
                return Err(SynError::new(attr.span(), "this attribute takes no arguments"))
            }
            _ => {}
        }
    }

    let span = attrs
        .first()
        .map(|attr| attr.span())
        .unwrap_or_else(Span::call_site);
    if parsed.inherits && (parsed.inject || parsed.has_helpers()) {
        return Err(SynError::new(
            span,
            "`#[inherits]` cannot be combined with injection attributes",
        ));
    }
    if !parsed.inject && parsed.has_helpers() {
        return Err(SynError::new(
            span,
            "injection attributes require `#[inject]` on the field",
        ));
    }

    Ok(parsed)
}
