use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields};

// derive_field_values
pub fn derive_field_values(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = if let Data::Struct(data) = &input.data {
        if let Fields::Named(named) = &data.fields {
            &named.named
        } else {
            let err = Error::new_spanned(
                &data.fields,
                "FieldValues can only be derived for structs with named fields",
            );
            return err.to_compile_error();
        }
    } else {
        let err = Error::new_spanned(
            &input.ident,
            "FieldValues can only be derived for structs with named fields",
        );
        return err.to_compile_error();
    };

    let mut mapped = Vec::new();
    for field in fields {
        match is_skipped(&field.attrs) {
            Ok(true) => {}
            Ok(false) => mapped.push(field),
            Err(err) => return err.to_compile_error(),
        }
    }

    let get_arms = mapped.iter().filter_map(|field| get_arm(field));
    let set_arms = mapped.iter().filter_map(|field| set_arm(field));

    quote! {
        impl #impl_generics ::docmap::traits::FieldValues for #ident #ty_generics #where_clause {
            fn get_value(&self, field: &str) -> Option<::docmap::value::FieldValue> {
                use ::docmap::traits::IntoFieldValue;

                match field {
                    #(#get_arms)*
                    _ => None,
                }
            }

            fn set_value(
                &mut self,
                field: &str,
                value: ::docmap::value::FieldValue,
            ) -> Result<(), ::docmap::value::FieldSetError> {
                use ::docmap::traits::FromFieldValue;

                match field {
                    #(#set_arms)*
                    _ => {
                        let _ = value;
                        Err(::docmap::value::FieldSetError::UnknownField {
                            field: field.to_string(),
                        })
                    }
                }
            }
        }

        impl #impl_generics ::docmap::traits::IntoFieldValue for #ident #ty_generics #where_clause {
            fn to_field_value(&self) -> ::docmap::value::FieldValue {
                ::docmap::value::FieldValue::Entity(::std::boxed::Box::new(
                    ::std::clone::Clone::clone(self),
                ))
            }
        }

        impl #impl_generics ::docmap::traits::FromFieldValue for #ident #ty_generics #where_clause {
            fn from_field_value(
                value: ::docmap::value::FieldValue,
            ) -> Result<Self, ::docmap::value::FieldSetError> {
                value.into_entity::<Self>()
            }
        }
    }
}

fn get_arm(field: &Field) -> Option<TokenStream> {
    let field_ident = field.ident.as_ref()?;
    let field_name = field_ident.to_string();

    Some(quote! {
        #field_name => Some(IntoFieldValue::to_field_value(&self.#field_ident)),
    })
}

fn set_arm(field: &Field) -> Option<TokenStream> {
    let field_ident = field.ident.as_ref()?;
    let field_name = field_ident.to_string();

    Some(quote! {
        #field_name => {
            self.#field_ident = FromFieldValue::from_field_value(value)
                .map_err(|err| err.in_field(#field_name))?;
            Ok(())
        }
    })
}

// #[field_values(skip)] keeps a field out of by-name access.
fn is_skipped(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skip = false;

    for attr in attrs {
        if !attr.path().is_ident("field_values") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported field_values option"))
            }
        })?;
    }

    Ok(skip)
}
