use crate::{Cardinality, Errors};

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Schema or registration defect: missing type names, unregistered
	/// kinds, ambiguous relationship members.
	Configuration,

	/// A related resource cannot be stored in the member declared for it.
	Binding,

	/// The document carries a top-level `errors` member, or no data where
	/// data was required.
	Content,

	/// The input is not valid JSON or not a valid JSON:API document.
	Format,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error("invalid document: {0}")]
	Format(String),

	#[error("a resource MUST contain a non-empty type but `{owner}` has none")]
	MissingType { owner: String },

	#[error("a resource MUST contain an `id` or `lid` but both are blank for type `{resource_type}`")]
	MissingIdentifier { resource_type: String },

	#[error("an error object MUST contain at least one member")]
	EmptyErrorObject,

	#[error("`{rust_type}` does not declare a resource type name")]
	UndeclaredType { rust_type: &'static str },

	#[error("`{rust_type}` declares a blank resource type name")]
	BlankTypeName { rust_type: &'static str },

	#[error("type name `{name}` of `{rust_type}` is already registered for `{registered}`")]
	DuplicateTypeName {
		name: &'static str,
		rust_type: &'static str,
		registered: &'static str,
	},

	#[error("`{owner}` binds relationship `{name}` to more than one member")]
	DuplicateRelationship { owner: &'static str, name: &'static str },

	#[error("`{shape}` is not a registered resource kind")]
	NotResourceKind { shape: String },

	#[error("no codec can handle `{shape}`")]
	NoCodec { shape: String },

	#[error("resource type `{type_name}` is not registered")]
	UnregisteredType { type_name: String },

	#[error("resources of `{rust_type}` are not registered")]
	UnregisteredResource { rust_type: &'static str },

	#[error("expected resource type `{expected}` but found `{found}`")]
	TypeMismatch { expected: String, found: String },

	#[error("cannot bind {found} relationship `{name}` to the {expected} member `{owner}::{member}`")]
	Cardinality {
		owner: &'static str,
		member: &'static str,
		name: &'static str,
		expected: Cardinality,
		found: Cardinality,
	},

	#[error("cannot bind relationship `{name}` to `{owner}::{member}`: expected `{expected}` but found `{found}`")]
	Binding {
		owner: &'static str,
		member: &'static str,
		name: &'static str,
		expected: &'static str,
		found: &'static str,
	},

	#[error("document contains errors: {0}")]
	Errors(Errors),

	#[error("document has no primary data")]
	MissingData,
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Json(_) | Self::Format(_) | Self::EmptyErrorObject => ErrorKind::Format,
			Self::Binding { .. } => ErrorKind::Binding,
			Self::Errors(_) | Self::MissingData => ErrorKind::Content,
			Self::MissingType { .. }
			| Self::MissingIdentifier { .. }
			| Self::UndeclaredType { .. }
			| Self::BlankTypeName { .. }
			| Self::DuplicateTypeName { .. }
			| Self::DuplicateRelationship { .. }
			| Self::NotResourceKind { .. }
			| Self::NoCodec { .. }
			| Self::UnregisteredType { .. }
			| Self::UnregisteredResource { .. }
			| Self::TypeMismatch { .. }
			| Self::Cardinality { .. } => ErrorKind::Configuration,
		}
	}

	/// Error objects carried by an error document, if this is one.
	pub fn errors(&self) -> Option<&Errors> {
		match self {
			Self::Errors(errors) => Some(errors),
			_ => None,
		}
	}
}
