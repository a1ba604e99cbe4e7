//! `Schematic` expansion for structs and enums

use crate::attr::{Constraints, Container, Field, RenameRule, Variant};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Data, DataEnum, DeriveInput, Error, Fields, FieldsNamed, Result, Type, parse_quote,
};

/// Expand `#[derive(Schematic)]`.
pub fn expand(mut input: DeriveInput) -> Result<TokenStream> {
    let container = Container::from_attrs(&input.attrs)?;
    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => object(fields, container.rename_all, None)?,
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                let field = &fields.unnamed[0];
                let attrs = Field::from_attrs(&field.attrs)?;
                nested(&field.ty, &attrs.constraints)
            }
            Fields::Unnamed(fields) => {
                return Err(Error::new_spanned(
                    fields,
                    "tuple structs with more than one field have no schema representation",
                ));
            }
            Fields::Unit => quote! { ::gai_core::Schema::object() },
        },
        Data::Enum(data) => enumeration(&container, data)?,
        Data::Union(_) => {
            return Err(Error::new_spanned(
                &input.ident,
                "unions have no schema representation",
            ));
        }
    };

    let mut meta = Vec::new();
    if let Some(title) = &container.title {
        meta.push(quote! { schema.title = ::std::string::String::from(#title); });
    }
    if let Some(description) = &container.description {
        meta.push(quote! { schema.description = ::std::string::String::from(#description); });
    }

    let params = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect::<Vec<_>>();
    let where_clause = input.generics.make_where_clause();
    for param in params {
        where_clause
            .predicates
            .push(parse_quote!(#param: ::gai_core::Schematic));
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::gai_core::Schematic for #ident #ty_generics #where_clause {
            fn schema() -> ::gai_core::Schema {
                #[allow(unused_mut)]
                let mut schema = #body;
                #(#meta)*
                schema
            }
        }
    })
}

/// Build an object schema from named fields, in declaration order.
fn object(
    fields: &FieldsNamed,
    rename_all: Option<RenameRule>,
    tag: Option<(&str, &str)>,
) -> Result<TokenStream> {
    let mut properties = Vec::new();
    if let Some((tag, value)) = tag {
        properties.push(quote! {
            schema.push_property(
                #tag,
                ::gai_core::Schema::string()
                    .with_enum(::std::vec![::std::string::String::from(#value)]),
                true,
            );
        });
    }

    for field in &fields.named {
        let attrs = Field::from_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        if attrs.flatten {
            return Err(Error::new_spanned(
                field,
                "flattened fields have no schema representation",
            ));
        }

        let Some(ident) = &field.ident else {
            return Err(Error::new_spanned(field, "expected a named field"));
        };
        let natural = ident.to_string();
        let natural = natural.trim_start_matches("r#");
        let name = match (&attrs.rename, rename_all) {
            (Some(rename), _) => rename.clone(),
            (None, Some(rule)) => rule.apply(natural),
            (None, None) => natural.to_owned(),
        };

        // required unless marked omit-empty, regardless of `Option`
        let required = !attrs.omit_empty;
        let schema = nested(&field.ty, &attrs.constraints);
        properties.push(quote! {
            schema.push_property(#name, #schema, #required);
        });
    }

    Ok(quote! {
        {
            let mut schema = ::gai_core::Schema::object();
            #(#properties)*
            schema
        }
    })
}

/// Generate the schema of a field type and apply its constraints.
fn nested(ty: &Type, constraints: &Constraints) -> TokenStream {
    let mut assigns = Vec::new();
    let strings = [
        (quote!(description), &constraints.description),
        (quote!(title), &constraints.title),
        (quote!(format), &constraints.format),
        (quote!(pattern), &constraints.pattern),
    ];
    for (key, value) in strings {
        if let Some(value) = value {
            assigns.push(quote! { field.#key = ::std::string::String::from(#value); });
        }
    }

    let floats = [
        (quote!(minimum), &constraints.minimum),
        (quote!(maximum), &constraints.maximum),
    ];
    for (key, value) in floats {
        if let Some(value) = value {
            assigns.push(quote! { field.#key = ::std::option::Option::Some((#value) as f64); });
        }
    }

    let counts = [
        (quote!(min_length), &constraints.min_length),
        (quote!(max_length), &constraints.max_length),
        (quote!(min_items), &constraints.min_items),
        (quote!(max_items), &constraints.max_items),
    ];
    for (key, value) in counts {
        if let Some(value) = value {
            assigns.push(quote! { field.#key = ::std::option::Option::Some((#value) as u64); });
        }
    }

    if let Some(values) = &constraints.enum_values {
        let elems = values.elems.iter();
        assigns.push(quote! {
            field.enumeration = ::std::vec![#(::std::string::ToString::to_string(&#elems)),*];
        });
    }

    let json = [
        (quote!(default), &constraints.default),
        (quote!(example), &constraints.example),
    ];
    for (key, value) in json {
        if let Some(value) = value {
            assigns.push(quote! {
                field.#key = ::std::option::Option::Some(::gai_core::__private::json!(#value));
            });
        }
    }

    quote! {
        {
            #[allow(unused_mut)]
            let mut field = ::gai_core::schema::nested::<#ty>();
            #(#assigns)*
            field
        }
    }
}

/// Unit-only enums become string enums, everything else becomes `anyOf`.
fn enumeration(container: &Container, data: &DataEnum) -> Result<TokenStream> {
    if container.content.is_some() {
        return Err(Error::new_spanned(
            &data.enum_token,
            "adjacently tagged enums have no schema representation",
        ));
    }

    let mut variants = Vec::new();
    for variant in &data.variants {
        let attrs = Variant::from_attrs(&variant.attrs)?;
        if attrs.skip {
            continue;
        }
        let natural = variant.ident.to_string();
        let name = match (&attrs.rename, container.rename_all) {
            (Some(rename), _) => rename.clone(),
            (None, Some(rule)) => rule.apply(&natural),
            (None, None) => natural,
        };
        variants.push((variant, attrs, name));
    }

    let unit_only = variants
        .iter()
        .all(|(variant, _, _)| matches!(variant.fields, Fields::Unit));
    if unit_only && !container.untagged && container.tag.is_none() {
        let names = variants.iter().map(|(_, _, name)| name);
        return Ok(quote! {
            ::gai_core::Schema::string()
                .with_enum(::std::vec![#(::std::string::String::from(#names)),*])
        });
    }

    let mut alternatives = Vec::new();
    for (variant, attrs, name) in &variants {
        let schema = match (&variant.fields, container.untagged, &container.tag) {
            (Fields::Unnamed(fields), _, _) if fields.unnamed.len() != 1 => {
                return Err(Error::new_spanned(
                    variant,
                    "tuple variants with more than one field have no schema representation",
                ));
            }
            (Fields::Unit, true, _) => {
                return Err(Error::new_spanned(
                    variant,
                    "unit variants of untagged enums have no schema representation",
                ));
            }
            (Fields::Unnamed(_), false, Some(_)) => {
                return Err(Error::new_spanned(
                    variant,
                    "newtype variants of internally tagged enums have no schema representation",
                ));
            }
            // internally tagged
            (Fields::Unit, false, Some(tag)) => {
                object(&empty(), None, Some((tag.as_str(), name.as_str())))?
            }
            (Fields::Named(fields), false, Some(tag)) => {
                object(fields, None, Some((tag.as_str(), name.as_str())))?
            }
            // untagged
            (Fields::Named(fields), true, _) => object(fields, None, None)?,
            (Fields::Unnamed(fields), true, _) => {
                nested(&fields.unnamed[0].ty, &Constraints::default())
            }
            // externally tagged
            (Fields::Unit, false, None) => quote! {
                ::gai_core::Schema::string()
                    .with_enum(::std::vec![::std::string::String::from(#name)])
            },
            (Fields::Named(fields), false, None) => {
                external(name, object(fields, None, None)?)
            }
            (Fields::Unnamed(fields), false, None) => {
                external(name, nested(&fields.unnamed[0].ty, &Constraints::default()))
            }
        };

        let description = attrs.description.as_ref().map(|description| {
            quote! { variant.description = ::std::string::String::from(#description); }
        });
        alternatives.push(quote! {
            {
                #[allow(unused_mut)]
                let mut variant = #schema;
                #description
                variant
            }
        });
    }

    Ok(quote! {
        ::gai_core::Schema::any_of(::std::vec![#(#alternatives),*])
    })
}

/// `{ "<name>": <inner> }`, the externally tagged variant shape.
fn external(name: &str, inner: TokenStream) -> TokenStream {
    quote! {
        {
            let mut schema = ::gai_core::Schema::object();
            schema.push_property(#name, #inner, true);
            schema
        }
    }
}

fn empty() -> FieldsNamed {
    parse_quote!({})
}
