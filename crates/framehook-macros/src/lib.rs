//! Procedural macros for framehook.
//!
//! Provides `#[derive(Instance)]`, which turns signal fields into statically
//! checked event names for `use_event(&owner, Owner::EventName)`.

mod attr_schema;
mod suggestions;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote, ToTokens};
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, Meta, Result, Token, Type};

use attr_schema::{default_event_name, get_key_names, is_valid_key};
use suggestions::{
    format_duplicate_event_error, format_missing_instance_id_error, format_unknown_key_error,
};

/// Derive `Instance` for a struct that owns named events.
///
/// Mark exactly one `InstanceId` field with `#[instance_id]`, and every
/// event-source field with `#[event]`. Each event becomes an associated
/// constant named after the field in PascalCase, or after
/// `#[event(name = "...")]` when given.
///
/// # Example
///
/// ```ignore
/// use framehook::prelude::*;
///
/// #[derive(Instance)]
/// struct Part {
///     #[instance_id]
///     id: InstanceId,
///     #[event]
///     touched: Signal<(String,)>,
///     #[event(name = "AncestryChanged")]
///     ancestry: Signal<()>,
/// }
///
/// for (index, (who,)) in use_event(&part, Part::Touched) {
///     println!("{index}: touched by {who}");
/// }
/// ```
#[proc_macro_derive(Instance, attributes(instance_id, event))]
pub fn derive_instance(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    expand_instance(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// A field marked `#[event]`.
struct EventField<'a> {
    field: &'a Ident,
    ty: &'a Type,
    /// The event name as written into `event_names`.
    name: LitStr,
    /// The associated constant exposing the event.
    ident: Ident,
}

fn expand_instance(input: &DeriveInput) -> Result<TokenStream2> {
    let owner = &input.ident;
    let fields = named_fields(input)?;

    let mut id_field: Option<&Ident> = None;
    let mut events: Vec<EventField> = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };

        for attr in &field.attrs {
            if attr.path().is_ident("instance_id") {
                parse_instance_id_attr(attr)?;
                if id_field.is_some() {
                    return Err(syn::Error::new_spanned(
                        attr,
                        format!("`{}` has more than one `#[instance_id]` field", owner),
                    ));
                }
                id_field = Some(field_ident);
            } else if attr.path().is_ident("event") {
                let event = parse_event_attr(attr, field_ident, &field.ty)?;
                if let Some(first) = events.iter().find(|e| e.name.value() == event.name.value()) {
                    return Err(syn::Error::new(
                        event.name.span(),
                        format_duplicate_event_error(
                            &owner.to_string(),
                            &event.name.value(),
                            &first.field.to_string(),
                        ),
                    ));
                }
                events.push(event);
            }
        }
    }

    let Some(id_field) = id_field else {
        let candidates = instance_id_candidates(fields);
        let candidates: Vec<&str> = candidates.iter().map(String::as_str).collect();
        return Err(syn::Error::new_spanned(
            owner,
            format_missing_instance_id_error(&owner.to_string(), &candidates),
        ));
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let names: Vec<&LitStr> = events.iter().map(|event| &event.name).collect();

    let event_items = events.iter().map(|event| {
        let EventField {
            field,
            ty,
            name,
            ident,
        } = event;
        let resolver = format_ident!("__framehook_event_{}", ident);
        let doc = format!(
            "The `{}` event, carried by the `{}` field.",
            name.value(),
            field
        );

        quote! {
            #[doc = #doc]
            #[allow(non_upper_case_globals)]
            pub const #ident: ::framehook::core::InstanceEvent<
                Self,
                <#ty as ::framehook::core::AsSignalLike>::Args,
            > = ::framehook::core::InstanceEvent::new(#name, Self::#resolver);

            #[doc(hidden)]
            #[allow(non_snake_case)]
            fn #resolver(
                &self,
            ) -> ::framehook::core::SignalLike<<#ty as ::framehook::core::AsSignalLike>::Args> {
                ::framehook::core::AsSignalLike::as_signal_like(&self.#field)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics #owner #ty_generics #where_clause {
            #(#event_items)*
        }

        impl #impl_generics ::framehook::core::Instance for #owner #ty_generics #where_clause {
            fn instance_id(&self) -> ::framehook::core::InstanceId {
                self.#id_field
            }

            fn event_names(&self) -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    })
}

fn named_fields(input: &DeriveInput) -> Result<&Punctuated<Field, Token![,]>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                "`#[derive(Instance)]` needs a struct with named fields",
            )),
        },
        Data::Enum(_) | Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "`#[derive(Instance)]` only supports structs",
        )),
    }
}

fn parse_instance_id_attr(attr: &Attribute) -> Result<()> {
    match &attr.meta {
        Meta::Path(_) => Ok(()),
        Meta::List(_) => attr.parse_nested_meta(|meta| {
            let key = meta.path.to_token_stream().to_string();
            Err(meta.error(format_unknown_key_error(
                "instance_id",
                &key,
                &get_key_names("instance_id"),
            )))
        }),
        Meta::NameValue(_) => Err(syn::Error::new_spanned(
            attr,
            "`#[instance_id]` takes no arguments",
        )),
    }
}

fn parse_event_attr<'a>(
    attr: &Attribute,
    field: &'a Ident,
    ty: &'a Type,
) -> Result<EventField<'a>> {
    let mut name: Option<LitStr> = None;

    if !matches!(attr.meta, Meta::Path(_)) {
        attr.parse_nested_meta(|meta| {
            let key = meta.path.to_token_stream().to_string();
            if !is_valid_key("event", &key) {
                return Err(meta.error(format_unknown_key_error(
                    "event",
                    &key,
                    &get_key_names("event"),
                )));
            }
            if name.is_some() {
                return Err(meta.error(format!("duplicate `{}` key", key)));
            }
            name = Some(meta.value()?.parse()?);
            Ok(())
        })?;
    }

    let name = name.unwrap_or_else(|| {
        LitStr::new(&default_event_name(&field.to_string()), field.span())
    });

    let mut ident: Ident = syn::parse_str(&name.value()).map_err(|_| {
        syn::Error::new(
            name.span(),
            format!("event name `{}` is not a valid Rust identifier", name.value()),
        )
    })?;
    ident.set_span(name.span());

    Ok(EventField {
        field,
        ty,
        name,
        ident,
    })
}

/// Fields that were probably meant to carry `#[instance_id]`.
fn instance_id_candidates(fields: &Punctuated<Field, Token![,]>) -> Vec<String> {
    fields
        .iter()
        .filter(|field| {
            let named_id = field.ident.as_ref().is_some_and(|ident| ident == "id");
            let typed_id = match &field.ty {
                Type::Path(path) => path
                    .path
                    .segments
                    .last()
                    .is_some_and(|segment| segment.ident == "InstanceId"),
                _ => false,
            };
            named_id || typed_id
        })
        .filter_map(|field| field.ident.as_ref().map(ToString::to_string))
        .collect()
}
