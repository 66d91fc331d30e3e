use std::collections::HashSet;
use std::fmt;

use proc_macro2::{Ident, Span, TokenStream, TokenTree};
use quote::{quote, ToTokens};
use syn::spanned::Spanned;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Parse(#[from] syn::parse::Error),

	#[error("`Resource` can only be derived on structs")]
	Unsupported(Span),

	#[error("resource type name must not be blank")]
	BlankType(Span),

	#[error("the `{0}` member is declared more than once")]
	DuplicateMember(Role, Span),

	#[error("relationship `{0}` is declared more than once")]
	DuplicateRelationship(String, Span),

	#[error("relationship members require a `#[jsonapi(relationships)]` member")]
	MissingRelationships(Span),

	#[error("JSON:API members are not attributes and must be `#[serde(skip)]`")]
	NotSkipped(Span),
}

impl Error {
	pub fn span(&self) -> Span {
		match self {
			Self::Parse(e) => e.span(),
			Self::Unsupported(span) => *span,
			Self::BlankType(span) => *span,
			Self::DuplicateMember(_, span) => *span,
			Self::DuplicateRelationship(_, span) => *span,
			Self::MissingRelationships(span) => *span,
			Self::NotSkipped(span) => *span,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
	Type,
	Id,
	Lid,
	Relationships,
	Links,
	Meta,
}

impl Role {
	fn from_ident(ident: &Ident) -> Option<Self> {
		if ident == "type" {
			Some(Self::Type)
		} else if ident == "id" {
			Some(Self::Id)
		} else if ident == "lid" {
			Some(Self::Lid)
		} else if ident == "relationships" {
			Some(Self::Relationships)
		} else if ident == "links" {
			Some(Self::Links)
		} else if ident == "meta" {
			Some(Self::Meta)
		} else {
			None
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Type => write!(f, "type"),
			Self::Id => write!(f, "id"),
			Self::Lid => write!(f, "lid"),
			Self::Relationships => write!(f, "relationships"),
			Self::Links => write!(f, "links"),
			Self::Meta => write!(f, "meta"),
		}
	}
}

#[derive(Clone, Copy)]
enum Cardinality {
	ToOne,
	ToMany,
}

enum FieldRole {
	Member(Role),
	Relationship(Cardinality, Option<syn::LitStr>),
}

/// `self.field` or `self.0`.
pub enum FieldAccess<'a> {
	Ident(&'a Ident),
	Index(syn::Index),
}

impl<'a> FieldAccess<'a> {
	pub fn new(f: &'a syn::Field, i: usize) -> Self {
		match &f.ident {
			Some(ident) => Self::Ident(ident),
			None => Self::Index(syn::Index {
				index: i as u32,
				span: f.span(),
			}),
		}
	}

	fn name(&self) -> String {
		match self {
			Self::Ident(ident) => ident.to_string(),
			Self::Index(i) => i.index.to_string(),
		}
	}
}

impl<'a> ToTokens for FieldAccess<'a> {
	fn to_tokens(&self, tokens: &mut TokenStream) {
		match self {
			Self::Ident(i) => tokens.extend(quote! {
				self.#i
			}),
			Self::Index(i) => tokens.extend(quote! {
				self.#i
			}),
		}
	}
}

struct Relationship<'a> {
	name: String,
	access: FieldAccess<'a>,
	ty: &'a syn::Type,
	cardinality: Cardinality,
}

fn extend_generics(generics: &syn::Generics) -> syn::Generics {
	let mut result = generics.clone();

	let bounds: Vec<syn::WherePredicate> = generics
		.type_params()
		.map(|p| {
			let ident = &p.ident;
			syn::parse_quote!(#ident: ::std::marker::Send + ::std::marker::Sync + 'static)
		})
		.collect();

	result.make_where_clause().predicates.extend(bounds);
	result
}

pub fn resource(input: syn::DeriveInput) -> Result<TokenStream, Error> {
	let type_name = parse_container_attributes(&input.attrs)?;
	let ident = &input.ident;

	let fields = match &input.data {
		syn::Data::Struct(s) => &s.fields,
		_ => return Err(Error::Unsupported(input.ident.span())),
	};

	let mut members = Vec::new();
	let mut roles = HashSet::new();
	let mut relationships: Vec<Relationship> = Vec::new();

	for (i, f) in fields.iter().enumerate() {
		let Some((role, span)) = parse_field_attributes(&f.attrs)? else {
			continue;
		};

		if !is_serde_skipped(&f.attrs) {
			return Err(Error::NotSkipped(f.span()));
		}

		let access = FieldAccess::new(f, i);

		match role {
			FieldRole::Member(role) => {
				if !roles.insert(role) {
					return Err(Error::DuplicateMember(role, span));
				}

				members.push(member_accessors(role, &access, &f.ty));
			}
			FieldRole::Relationship(cardinality, name) => {
				let name = match name {
					Some(name) => name.value(),
					None => access.name(),
				};

				if relationships.iter().any(|r| r.name == name) {
					return Err(Error::DuplicateRelationship(name, span));
				}

				relationships.push(Relationship {
					name,
					access,
					ty: &f.ty,
					cardinality,
				})
			}
		}
	}

	if !relationships.is_empty() && !roles.contains(&Role::Relationships) {
		return Err(Error::MissingRelationships(input.ident.span()));
	}

	let declared_type = match &type_name {
		Some(name) => quote!(::std::option::Option::Some(#name)),
		None => quote!(::std::option::Option::None),
	};

	let linkage = relationship_accessors(&relationships);

	let generics = extend_generics(&input.generics);
	let (impl_generics, _, where_clause) = generics.split_for_impl();
	let (_, type_generics, _) = input.generics.split_for_impl();

	Ok(quote! {
		impl #impl_generics ::jsonapi::Resource for #ident #type_generics #where_clause {
			fn declared_type() -> ::std::option::Option<&'static str> {
				#declared_type
			}

			fn class_type(&self) -> ::std::option::Option<&'static str> {
				#declared_type
			}

			#(#members)*

			#linkage
		}
	})
}

fn member_accessors(role: Role, access: &FieldAccess, ty: &syn::Type) -> TokenStream {
	let string = quote!(::std::string::String);
	let option = quote!(::std::option::Option);

	let string_member = |getter: Ident, setter: Ident| {
		quote! {
			fn #getter(&self) -> #option<&str> {
				<#ty as ::jsonapi::OptionalMember<#string>>::get(&#access).map(#string::as_str)
			}

			fn #setter(&mut self, value: #string) {
				<#ty as ::jsonapi::OptionalMember<#string>>::set(&mut #access, #option::Some(value))
			}
		}
	};

	match role {
		Role::Type => string_member(
			Ident::new("type_member", Span::call_site()),
			Ident::new("set_type_member", Span::call_site()),
		),
		Role::Id => string_member(
			Ident::new("id_member", Span::call_site()),
			Ident::new("set_id_member", Span::call_site()),
		),
		Role::Lid => string_member(
			Ident::new("lid_member", Span::call_site()),
			Ident::new("set_lid_member", Span::call_site()),
		),
		Role::Relationships => quote! {
			fn relationships_member(&self) -> #option<&::jsonapi::Relationships> {
				<#ty as ::jsonapi::OptionalMember<::jsonapi::Relationships>>::get(&#access)
			}

			fn set_relationships_member(&mut self, value: #option<::jsonapi::Relationships>) {
				<#ty as ::jsonapi::OptionalMember<::jsonapi::Relationships>>::set(&mut #access, value)
			}
		},
		Role::Links => quote! {
			fn links_member(&self) -> #option<&::jsonapi::Links> {
				<#ty as ::jsonapi::OptionalMember<::jsonapi::Links>>::get(&#access)
			}

			fn set_links_member(&mut self, value: ::jsonapi::Links) {
				<#ty as ::jsonapi::OptionalMember<::jsonapi::Links>>::set(&mut #access, #option::Some(value))
			}
		},
		Role::Meta => quote! {
			fn meta_member(&self) -> #option<&::jsonapi::Meta> {
				<#ty as ::jsonapi::OptionalMember<::jsonapi::Meta>>::get(&#access)
			}

			fn set_meta_member(&mut self, value: ::jsonapi::Meta) {
				<#ty as ::jsonapi::OptionalMember<::jsonapi::Meta>>::set(&mut #access, #option::Some(value))
			}
		},
	}
}

fn relationship_accessors(relationships: &[Relationship]) -> TokenStream {
	if relationships.is_empty() {
		return TokenStream::new();
	}

	let fields = relationships.iter().map(|r| {
		let name = &r.name;
		let member = r.access.name();
		let cardinality = match r.cardinality {
			Cardinality::ToOne => quote!(::jsonapi::Cardinality::ToOne),
			Cardinality::ToMany => quote!(::jsonapi::Cardinality::ToMany),
		};

		quote! {
			::jsonapi::RelationshipField {
				name: #name,
				member: #member,
				cardinality: #cardinality,
			}
		}
	});

	let mut linkage = TokenStream::new();
	let mut take = TokenStream::new();
	let mut assign = TokenStream::new();

	for (i, r) in relationships.iter().enumerate() {
		let access = &r.access;
		let ty = r.ty;

		match r.cardinality {
			Cardinality::ToOne => {
				linkage.extend(quote! {
					#i => ::jsonapi::Linkage::from_one(<#ty as ::jsonapi::ToOneMember>::linkage(&#access)),
				});
				take.extend(quote! {
					#i => ::jsonapi::Linkage::from_one(<#ty as ::jsonapi::ToOneMember>::take(&mut #access)),
				});
				assign.extend(quote! {
					#i => ::jsonapi::member::assign_one(&mut #access, linkage),
				});
			}
			Cardinality::ToMany => {
				linkage.extend(quote! {
					#i => ::jsonapi::Linkage::from_many(<#ty as ::jsonapi::ToManyMember>::linkage(&#access)),
				});
				take.extend(quote! {
					#i => ::jsonapi::Linkage::from_many(<#ty as ::jsonapi::ToManyMember>::take(&mut #access)),
				});
				assign.extend(quote! {
					#i => ::jsonapi::member::assign_many(&mut #access, linkage),
				});
			}
		}
	}

	quote! {
		fn relationship_fields(&self) -> &'static [::jsonapi::RelationshipField] {
			const FIELDS: &[::jsonapi::RelationshipField] = &[#(#fields),*];
			FIELDS
		}

		fn linkage(&self, index: usize) -> ::jsonapi::Linkage {
			match index {
				#linkage
				_ => ::jsonapi::Linkage::Empty,
			}
		}

		fn take_linkage(&mut self, index: usize) -> ::jsonapi::Linkage {
			match index {
				#take
				_ => ::jsonapi::Linkage::Empty,
			}
		}

		fn assign_linkage(
			&mut self,
			index: usize,
			linkage: ::jsonapi::Linkage,
		) -> ::std::result::Result<(), ::jsonapi::Mismatch> {
			match index {
				#assign
				_ => ::std::result::Result::Ok(()),
			}
		}
	}
}

fn parse_container_attributes(attributes: &[syn::Attribute]) -> Result<Option<syn::LitStr>, Error> {
	let mut type_name: Option<syn::LitStr> = None;

	for attr in attributes {
		if attr.path().is_ident("jsonapi") {
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("type") {
					type_name = Some(meta.value()?.parse()?);
					Ok(())
				} else {
					Err(meta.error("unknown `jsonapi` attribute"))
				}
			})?;
		}
	}

	if let Some(name) = &type_name {
		if name.value().trim().is_empty() {
			return Err(Error::BlankType(name.span()));
		}
	}

	Ok(type_name)
}

fn parse_field_attributes(attributes: &[syn::Attribute]) -> Result<Option<(FieldRole, Span)>, Error> {
	let mut result: Option<(FieldRole, Span)> = None;

	for attr in attributes {
		if attr.path().is_ident("jsonapi") {
			attr.parse_nested_meta(|meta| {
				if result.is_some() {
					return Err(meta.error("a field holds at most one JSON:API member"));
				}

				let span = meta.path.span();
				let Some(ident) = meta.path.get_ident() else {
					return Err(meta.error("unknown `jsonapi` attribute"));
				};

				let role = if ident == "to_one" || ident == "to_many" {
					let cardinality = if ident == "to_one" {
						Cardinality::ToOne
					} else {
						Cardinality::ToMany
					};

					let name = if meta.input.peek(syn::Token![=]) {
						Some(meta.value()?.parse::<syn::LitStr>()?)
					} else {
						None
					};

					FieldRole::Relationship(cardinality, name)
				} else {
					match Role::from_ident(ident) {
						Some(role) => FieldRole::Member(role),
						None => return Err(meta.error("unknown `jsonapi` attribute")),
					}
				};

				result = Some((role, span));
				Ok(())
			})?;
		}
	}

	Ok(result)
}

/// Checks for a `#[serde(skip)]` attribute.
fn is_serde_skipped(attributes: &[syn::Attribute]) -> bool {
	attributes.iter().any(|attr| {
		attr.path().is_ident("serde")
			&& match &attr.meta {
				syn::Meta::List(list) => list
					.tokens
					.clone()
					.into_iter()
					.any(|t| matches!(t, TokenTree::Ident(id) if id == "skip")),
				_ => false,
			}
	})
}
