mod attrs;
mod impls;

use proc_macro::TokenStream;

#[proc_macro_derive(
    Injectable,
    attributes(inject, named, or_none, erased, provider, factory, inherits)
)]
pub fn injectable(item: TokenStream) -> TokenStream {
    match impls::expand_reflected(item.into()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
