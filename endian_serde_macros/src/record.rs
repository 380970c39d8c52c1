use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, DataStruct, DeriveInput, Field};

/// the byte order handling of a single field, resolved from its `#[endian(...)]` attribute.
enum FieldOrder {
    /// always big-endian, whatever order the enclosing context uses.
    Big,
    /// always little-endian.
    Little,
    /// no override, the field uses the order inherited from the enclosing context.
    Inherited,
    /// the field takes no part in encoding or decoding and consumes no stream bytes.
    Ignored,
}

/// resolves the byte order handling of a field from its attributes.
///
/// unrecognized attribute values mean "no override" rather than an error, so that schema
/// structs shared with other tools keep deriving cleanly.
fn field_order(field: &Field) -> FieldOrder {
    for attr in &field.attrs {
        if !attr.path().is_ident("endian") {
            continue;
        }
        let syn::Meta::List(meta_list) = &attr.meta else {
            continue;
        };
        let raw = meta_list.tokens.to_string();
        return match raw.trim().trim_matches('"') {
            "big" => FieldOrder::Big,
            "little" => FieldOrder::Little,
            "ignore" => FieldOrder::Ignored,
            _ => FieldOrder::Inherited,
        };
    }
    FieldOrder::Inherited
}

/// a field that takes part in the walk: how to reach it, which byte order expression to hand
/// to its recursion step, and its type for the where-clause predicates.
struct ActiveField {
    accessor: syn::Member,
    order_expr: TokenStream,
    ty: syn::Type,
}

/// collects the active fields in declaration order. ignored fields are dropped here, once,
/// so none of the generated methods ever see them.
fn active_fields(data_struct: &DataStruct) -> Vec<ActiveField> {
    data_struct
        .fields
        .iter()
        .enumerate()
        .filter_map(|(field_index, field)| {
            let order_expr = match field_order(field) {
                FieldOrder::Big => quote! { ::endian_serde::Endianness::Big },
                FieldOrder::Little => quote! { ::endian_serde::Endianness::Little },
                FieldOrder::Inherited => quote! { order },
                FieldOrder::Ignored => return None,
            };
            let accessor = match &field.ident {
                Some(ident) => syn::Member::Named(ident.clone()),
                None => syn::Member::Unnamed(syn::Index::from(field_index)),
            };
            Some(ActiveField {
                accessor,
                order_expr,
                ty: field.ty.clone(),
            })
        })
        .collect()
}

pub(crate) fn derive_for_struct(input: &DeriveInput, data_struct: &DataStruct) -> TokenStream {
    let fields = active_fields(data_struct);

    let mut generics = input.generics.clone();
    {
        let where_clause = generics.make_where_clause();
        for field in &fields {
            let ty = &field.ty;
            where_clause
                .predicates
                .push(parse_quote! { #ty: ::endian_serde::EndianSerde });
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let type_ident = &input.ident;

    let wire_size_terms = fields.iter().map(|field| {
        let accessor = &field.accessor;
        quote! { ::endian_serde::EndianSerde::wire_size(&self.#accessor) }
    });
    let serialize_statements = fields.iter().map(|field| {
        let accessor = &field.accessor;
        let order_expr = &field.order_expr;
        quote! {
            ::endian_serde::EndianSerde::endian_serialize(
                &self.#accessor,
                stream,
                #order_expr,
                default_order,
            )?;
        }
    });
    let deserialize_statements = fields.iter().map(|field| {
        let accessor = &field.accessor;
        let order_expr = &field.order_expr;
        quote! {
            ::endian_serde::EndianSerde::endian_deserialize(
                &mut self.#accessor,
                stream,
                #order_expr,
                default_order,
            )?;
        }
    });

    quote! {
        #[automatically_derived]
        #[allow(unused_variables)]
        impl #impl_generics ::endian_serde::EndianSerde for #type_ident #ty_generics #where_clause {
            fn wire_size(&self) -> usize {
                0 #(+ #wire_size_terms)*
            }

            fn endian_serialize<__W: ::std::io::Write + ?Sized>(
                &self,
                stream: &mut __W,
                order: ::endian_serde::Endianness,
                default_order: ::endian_serde::Endianness,
            ) -> ::core::result::Result<(), ::endian_serde::Error> {
                #(#serialize_statements)*
                ::core::result::Result::Ok(())
            }

            fn endian_deserialize<__R: ::std::io::Read + ?Sized>(
                &mut self,
                stream: &mut __R,
                order: ::endian_serde::Endianness,
                default_order: ::endian_serde::Endianness,
            ) -> ::core::result::Result<(), ::endian_serde::Error> {
                #(#deserialize_statements)*
                ::core::result::Result::Ok(())
            }
        }
    }
}
