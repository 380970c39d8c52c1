//! derive macro for the `endian_serde` crate. see that crate's docs for the full story of
//! the format and the byte order resolution rules.

mod record;

use quote::quote_spanned;
use syn::{parse_macro_input, spanned::Spanned, DeriveInput};

#[proc_macro_derive(EndianSerde, attributes(endian))]
pub fn derive_endian_serde(input_tokens: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input_tokens as DeriveInput);
    match &input.data {
        syn::Data::Struct(data_struct) => record::derive_for_struct(&input, data_struct).into(),
        syn::Data::Enum(data_enum) => quote_spanned! {
            data_enum.enum_token.span() => compile_error!("enums are not a record shape, only structs are supported");
        }
        .into(),
        syn::Data::Union(data_union) => quote_spanned! {
            data_union.union_token.span() => compile_error!("unions are not supported, only structs are supported");
        }
        .into(),
    }
}
