use proc_macro::TokenStream;
use proc_macro_error::{abort, proc_macro_error};

mod generate;

/// Derives `jsonapi::Resource`.
///
/// The struct declares its type name with `#[jsonapi(type = "...")]`. Fields
/// holding JSON:API members are annotated with `#[jsonapi(type)]`,
/// `#[jsonapi(id)]`, `#[jsonapi(lid)]`, `#[jsonapi(relationships)]`,
/// `#[jsonapi(links)]`, `#[jsonapi(meta)]`, `#[jsonapi(to_one = "name")]` or
/// `#[jsonapi(to_many = "name")]`, and must be `#[serde(skip)]` since they are
/// not attributes.
#[proc_macro_derive(Resource, attributes(jsonapi))]
#[proc_macro_error]
pub fn derive_resource(input: TokenStream) -> TokenStream {
	let input = syn::parse_macro_input!(input as syn::DeriveInput);
	match generate::resource(input) {
		Ok(tokens) => tokens.into(),
		Err(e) => {
			abort!(e.span(), e)
		}
	}
}
