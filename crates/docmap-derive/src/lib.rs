use proc_macro::TokenStream;

mod field_values;

/// Generates by-name field access (`FieldValues`) plus the conversions that
/// let the entity travel inside a `FieldValue`. The type must also be
/// `Clone` and implement `EntityKind`.
#[proc_macro_derive(FieldValues, attributes(field_values))]
pub fn derive_field_values(input: TokenStream) -> TokenStream {
    field_values::derive_field_values(input.into()).into()
}
