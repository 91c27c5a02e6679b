use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    Data, DataStruct, DeriveInput, Error as SynError, Field, Fields, GenericArgument, Ident,
    LitStr, PathArguments, Result as SynResult, Type, TypePath,
};

use crate::attrs::{self, FieldAttributes};

/// The wrapper shape an injected field's type spells out syntactically.
enum Shape<'a> {
    Instance(&'a Type),
    Provider(&'a Type),
    Factory(&'a Type, &'a Type),
    Deferred(Box<Shape<'a>>),
}

struct PointData<'a> {
    ident: &'a Ident,
    shape: Shape<'a>,
    optional: bool,
    attrs: FieldAttributes,
}

pub fn expand_reflected(item: TokenStream2) -> SynResult<TokenStream2> {
    let input = syn::parse2::<DeriveInput>(item)?;

    if !input.generics.params.is_empty() {
        return Err(SynError::new(
            input.generics.span(),
            "generic types should implement `Reflected` by hand",
        ));
    }
    let Data::Struct(DataStruct {
        fields: Fields::Named(fields),
        ..
    }) = &input.data
    else {
        return Err(SynError::new(
            input.ident.span(),
            "`#[derive(Injectable)]` expects a struct with named fields",
        ));
    };

    let ident = &input.ident;
    let name = LitStr::new(&ident.to_string(), ident.span());

    let mut parent: Option<(&Ident, &Type)> = None;
    let mut points = Vec::new();
    let mut literal_entries = Vec::new();

    for field in &fields.named {
        let field_attrs = attrs::parse_field_attributes(&field.attrs)?;
        let field_ident = field.ident.as_ref().unwrap();

        if field_attrs.inherits {
            if parent.is_some() {
                return Err(SynError::new(
                    field.span(),
                    "at most one field can be annotated with `#[inherits]`",
                ));
            }
            parent = Some((field_ident, &field.ty));
            literal_entries.push(quote! { #field_ident: ::core::default::Default::default() });
        } else if field_attrs.inject {
            let point = parse_point(field, field_attrs)?;
            let convert = convert_expr(&point.shape, point.optional, quote! { arguments.take() });
            literal_entries.push(quote! { #field_ident: #convert });
            points.push(point);
        } else {
            literal_entries.push(quote! { #field_ident: ::core::default::Default::default() });
        }
    }

    let field_infos = points.iter().map(|point| {
        let field_ident = point.ident;
        let field_name = LitStr::new(&field_ident.to_string(), field_ident.span());
        let descriptor = descriptor_expr(&point.shape, &point.attrs);
        let markers = markers_expr(point);
        let convert = convert_expr(&point.shape, point.optional, quote! { resolved });
        quote! {
            .with_field(autowire::reflect::FieldInfo::of(
                #field_name,
                #descriptor,
                #markers,
                |receiver: &mut Self, resolved| {
                    receiver.#field_ident = #convert;
                },
            ))
        }
    });

    let params = points.iter().map(|point| {
        let descriptor = descriptor_expr(&point.shape, &point.attrs);
        let markers = markers_expr(point);
        quote! { autowire::reflect::ParamInfo::new(#descriptor, #markers) }
    });

    let parent_link = parent.map(|(field_ident, parent_ty)| {
        quote! {
            .with_parent::<Self, #parent_ty>(|receiver| &mut receiver.#field_ident)
        }
    });

    let arguments_binding = if points.is_empty() {
        quote! { _arguments }
    } else {
        quote! { mut arguments }
    };

    Ok(quote! {
        impl autowire::reflect::Reflected for #ident {
            fn class_info() -> autowire::reflect::ClassInfo {
                autowire::reflect::ClassInfo::new::<Self>(#name)
                    #(#field_infos)*
                    #parent_link
                    .with_constructor(autowire::reflect::ConstructorInfo::of(
                        "new",
                        ::std::vec![#(#params),*],
                        |#arguments_binding: autowire::reflect::Arguments| Self {
                            #(#literal_entries),*
                        },
                    ))
            }
        }
    })
}

fn parse_point(field: &Field, attrs: FieldAttributes) -> SynResult<PointData<'_>> {
    let (optional, shape) = parse_shape(&field.ty)?;

    // A deferred cell represents absence at first access; every other
    // shape needs the `Option` spelling to hold a missing value.
    if attrs.or_none && !optional && !matches!(shape, Shape::Deferred(_)) {
        return Err(SynError::new(
            field.ty.span(),
            "`#[or_none]` expects an `Option<...>` or `Lazy<...>` field",
        ));
    }
    if attrs.provider && !matches!(shape, Shape::Provider(_)) {
        return Err(SynError::new(
            field.ty.span(),
            "`#[provider]` expects a `ProviderOf<T>` field",
        ));
    }
    if attrs.factory && !matches!(shape, Shape::Factory(..)) {
        return Err(SynError::new(
            field.ty.span(),
            "`#[factory]` expects a `FactoryOf<A, T>` field",
        ));
    }

    Ok(PointData {
        ident: field.ident.as_ref().unwrap(),
        shape,
        optional,
        attrs,
    })
}

fn parse_shape(ty: &Type) -> SynResult<(bool, Shape<'_>)> {
    if let Some(arguments) = split_wrapper(ty, "Option") {
        let inner = sole_argument(ty, &arguments)?;
        if split_wrapper(inner, "Lazy").is_some() {
            return Err(SynError::new(
                ty.span(),
                "an optional deferred point should spell `Lazy<T>` with `#[or_none]`",
            ));
        }
        Ok((true, parse_inner_shape(inner, true)?))
    } else {
        Ok((false, parse_inner_shape(ty, true)?))
    }
}

fn parse_inner_shape(ty: &Type, allow_deferred: bool) -> SynResult<Shape<'_>> {
    if let Some(arguments) = split_wrapper(ty, "Lazy") {
        if !allow_deferred {
            return Err(SynError::new(ty.span(), "`Lazy` cannot nest"));
        }
        let inner = sole_argument(ty, &arguments)?;
        if split_wrapper(inner, "Option").is_some() {
            return Err(SynError::new(
                ty.span(),
                "`Lazy<Option<T>>` should spell `Lazy<T>` with `#[or_none]`",
            ));
        }
        return Ok(Shape::Deferred(Box::new(parse_inner_shape(inner, false)?)));
    }
    if let Some(arguments) = split_wrapper(ty, "ProviderOf") {
        return Ok(Shape::Provider(sole_argument(ty, &arguments)?));
    }
    if let Some(arguments) = split_wrapper(ty, "FactoryOf") {
        let [argument, result] = arguments[..] else {
            return Err(SynError::new(
                ty.span(),
                "`FactoryOf` expects an argument type and a result type",
            ));
        };
        return Ok(Shape::Factory(argument, result));
    }
    Ok(Shape::Instance(ty))
}

fn split_wrapper<'a>(ty: &'a Type, name: &str) -> Option<Vec<&'a Type>> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let segment = path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    let types = arguments
        .args
        .iter()
        .filter_map(|argument| match argument {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect();
    Some(types)
}

fn sole_argument<'a>(ty: &Type, arguments: &[&'a Type]) -> SynResult<&'a Type> {
    let &[inner] = arguments else {
        return Err(SynError::new(
            ty.span(),
            "this wrapper expects exactly one type argument",
        ));
    };
    Ok(inner)
}

fn descriptor_expr(shape: &Shape<'_>, attrs: &FieldAttributes) -> TokenStream2 {
    match shape {
        Shape::Instance(ty) => match &attrs.raw {
            Some(raw) => quote! {
                autowire::binding::TypeDescriptor::parameterized::<#ty>(
                    autowire::binding::TypeKey::of::<#raw>(),
                )
            },
            None => quote! { autowire::binding::TypeDescriptor::of::<#ty>() },
        },
        Shape::Provider(result) => {
            let result = descriptor_expr(&Shape::Instance(result), attrs);
            if attrs.provider {
                quote! { autowire::binding::TypeDescriptor::fn0(#result) }
            } else {
                quote! { autowire::binding::TypeDescriptor::provider_of(#result) }
            }
        }
        Shape::Factory(argument, result) => {
            let result = descriptor_expr(&Shape::Instance(result), attrs);
            quote! {
                autowire::binding::TypeDescriptor::fn1(
                    autowire::binding::TypeDescriptor::of::<#argument>(),
                    #result,
                )
            }
        }
        Shape::Deferred(inner) => {
            let inner = descriptor_expr(inner, attrs);
            quote! { autowire::binding::TypeDescriptor::deferred(#inner) }
        }
    }
}

fn markers_expr(point: &PointData<'_>) -> TokenStream2 {
    let mut entries = Vec::new();
    if let Some(name) = &point.attrs.named {
        entries.push(quote! { autowire::marker::Named(#name) });
    }
    if point.optional || point.attrs.or_none {
        entries.push(quote! { autowire::marker::OrNone });
    }
    if point.attrs.erased {
        entries.push(quote! { autowire::marker::Erased });
    }
    if point.attrs.provider {
        entries.push(quote! { autowire::marker::ProviderFn });
    }
    if point.attrs.factory {
        entries.push(quote! { autowire::marker::FactoryFn });
    }

    if entries.is_empty() {
        quote! { ::std::vec::Vec::new() }
    } else {
        let entries = entries.iter().map(|entry| {
            quote! { ::std::boxed::Box::new(#entry) as ::std::boxed::Box<dyn autowire::marker::Marker> }
        });
        quote! { ::std::vec![#(#entries),*] }
    }
}

fn convert_expr(shape: &Shape<'_>, optional: bool, value: TokenStream2) -> TokenStream2 {
    match shape {
        Shape::Instance(_) => {
            if optional {
                quote! { #value.into_option() }
            } else {
                quote! { #value.into_value() }
            }
        }
        Shape::Provider(_) => {
            if optional {
                quote! { #value.into_provider_or_none() }
            } else {
                quote! { #value.into_provider() }
            }
        }
        Shape::Factory(..) => {
            if optional {
                quote! { #value.into_factory_or_none() }
            } else {
                quote! { #value.into_factory() }
            }
        }
        Shape::Deferred(inner) => {
            let convert = match inner.as_ref() {
                Shape::Instance(ty) => quote! { autowire::wrapper::Resolved::into_option::<#ty> },
                Shape::Provider(ty) => {
                    quote! { autowire::wrapper::Resolved::into_provider_or_none::<#ty> }
                }
                Shape::Factory(argument, result) => {
                    quote! { autowire::wrapper::Resolved::into_factory_or_none::<#argument, #result> }
                }
                Shape::Deferred(_) => unreachable!("`Lazy` should not nest"),
            };
            quote! { autowire::wrapper::Lazy::new(#value.into_deferred(), #convert) }
        }
    }
}
