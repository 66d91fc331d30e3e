use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Links, Meta};

/// Error object, as found in the top-level `errors` member of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawErrorObject")]
pub struct ErrorObject {
	#[serde(skip_serializing_if = "Option::is_none")]
	id: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	links: Option<Links>,

	#[serde(skip_serializing_if = "Option::is_none")]
	status: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	code: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	title: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	detail: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	source: Option<Source>,

	#[serde(skip_serializing_if = "Option::is_none")]
	meta: Option<Meta>,
}

#[derive(Deserialize)]
struct RawErrorObject {
	id: Option<String>,
	links: Option<Links>,
	status: Option<String>,
	code: Option<String>,
	title: Option<String>,
	detail: Option<String>,
	source: Option<Source>,
	meta: Option<Meta>,
}

impl TryFrom<RawErrorObject> for ErrorObject {
	type Error = Error;

	fn try_from(raw: RawErrorObject) -> Result<Self, Error> {
		ErrorObject {
			id: raw.id,
			links: raw.links,
			status: raw.status,
			code: raw.code,
			title: raw.title,
			detail: raw.detail,
			source: raw.source,
			meta: raw.meta,
		}
		.validate()
	}
}

impl ErrorObject {
	pub fn builder() -> ErrorObjectBuilder {
		ErrorObjectBuilder::default()
	}

	fn validate(self) -> Result<Self, Error> {
		if self == Self::default() {
			Err(Error::EmptyErrorObject)
		} else {
			Ok(self)
		}
	}

	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	pub fn links(&self) -> Option<&Links> {
		self.links.as_ref()
	}

	pub fn status(&self) -> Option<&str> {
		self.status.as_deref()
	}

	pub fn code(&self) -> Option<&str> {
		self.code.as_deref()
	}

	pub fn title(&self) -> Option<&str> {
		self.title.as_deref()
	}

	pub fn detail(&self) -> Option<&str> {
		self.detail.as_deref()
	}

	pub fn source(&self) -> Option<&Source> {
		self.source.as_ref()
	}

	pub fn meta(&self) -> Option<&Meta> {
		self.meta.as_ref()
	}
}

impl fmt::Display for ErrorObject {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if let Some(status) = &self.status {
			write!(f, "[{status}] ")?;
		}

		match (&self.title, &self.detail) {
			(Some(title), Some(detail)) => write!(f, "{title}: {detail}"),
			(Some(text), None) | (None, Some(text)) => f.write_str(text),
			(None, None) => match (&self.code, &self.id) {
				(Some(code), _) => write!(f, "code {code}"),
				(None, Some(id)) => write!(f, "error {id}"),
				(None, None) => f.write_str("error"),
			},
		}
	}
}

#[derive(Debug, Default)]
pub struct ErrorObjectBuilder(ErrorObject);

impl ErrorObjectBuilder {
	pub fn id(mut self, value: impl Into<String>) -> Self {
		self.0.id = Some(value.into());
		self
	}

	pub fn links(mut self, value: Links) -> Self {
		self.0.links = Some(value);
		self
	}

	pub fn status(mut self, value: impl Into<String>) -> Self {
		self.0.status = Some(value.into());
		self
	}

	pub fn code(mut self, value: impl Into<String>) -> Self {
		self.0.code = Some(value.into());
		self
	}

	pub fn title(mut self, value: impl Into<String>) -> Self {
		self.0.title = Some(value.into());
		self
	}

	pub fn detail(mut self, value: impl Into<String>) -> Self {
		self.0.detail = Some(value.into());
		self
	}

	pub fn source(mut self, value: Source) -> Self {
		self.0.source = Some(value);
		self
	}

	pub fn meta(mut self, value: Meta) -> Self {
		self.0.meta = Some(value);
		self
	}

	pub fn build(self) -> Result<ErrorObject, Error> {
		self.0.validate()
	}
}

/// Reference to the primary source of an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pointer: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parameter: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub header: Option<String>,
}

/// Error objects of an error document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Errors(pub Vec<ErrorObject>);

impl Errors {
	pub fn iter(&self) -> std::slice::Iter<'_, ErrorObject> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for Errors {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, error) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str("; ")?;
			}

			write!(f, "{error}")?;
		}

		Ok(())
	}
}

impl From<Vec<ErrorObject>> for Errors {
	fn from(errors: Vec<ErrorObject>) -> Self {
		Self(errors)
	}
}

impl IntoIterator for Errors {
	type Item = ErrorObject;
	type IntoIter = std::vec::IntoIter<ErrorObject>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn requires_at_least_one_member() {
		assert!(matches!(ErrorObject::builder().build(), Err(Error::EmptyErrorObject)));
		assert!(serde_json::from_value::<ErrorObject>(json!({})).is_err());
		assert!(ErrorObject::builder().code("10").build().is_ok());
	}

	#[test]
	fn reads_all_members() {
		let error: ErrorObject = serde_json::from_value(json!({
			"id": "1",
			"status": "422",
			"code": "invalid",
			"title": "Invalid Attribute",
			"detail": "First name must contain at least two characters.",
			"source": { "pointer": "/data/attributes/firstName" },
			"meta": { "attempt": 2 }
		}))
		.unwrap();

		assert_eq!(error.status(), Some("422"));
		assert_eq!(
			error.source().and_then(|s| s.pointer.as_deref()),
			Some("/data/attributes/firstName")
		);
		assert_eq!(error.meta().and_then(|m| m.integer("attempt")), Some(2));
		assert_eq!(
			error.to_string(),
			"[422] Invalid Attribute: First name must contain at least two characters."
		);
	}
}
