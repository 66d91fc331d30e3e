#![allow(dead_code)]
use jsonapi::{Handle, JsonApi, Links, Meta, Relationships, Resource};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Default, Serialize, Deserialize, Resource)]
#[jsonapi(type = "articles")]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
	#[serde(skip)]
	#[jsonapi(id)]
	pub id: Option<String>,

	#[serde(skip)]
	#[jsonapi(relationships)]
	pub relationships: Option<Relationships>,

	#[serde(skip)]
	#[jsonapi(links)]
	pub links: Option<Links>,

	pub title: String,

	#[serde(skip)]
	#[jsonapi(to_one = "author")]
	pub author: Option<Handle<Person>>,

	#[serde(skip)]
	#[jsonapi(to_many = "comments")]
	pub comments: Option<Vec<Handle<Comment>>>,
}

#[derive(Debug, Default, Serialize, Deserialize, Resource)]
#[jsonapi(type = "people")]
#[serde(default, rename_all = "camelCase")]
pub struct Person {
	#[serde(skip)]
	#[jsonapi(id)]
	pub id: Option<String>,

	#[serde(skip)]
	#[jsonapi(meta)]
	pub meta: Meta,

	pub first_name: String,

	pub last_name: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub twitter: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Resource)]
#[jsonapi(type = "comments")]
#[serde(default)]
pub struct Comment {
	#[serde(skip)]
	#[jsonapi(id)]
	pub id: Option<String>,

	#[serde(skip)]
	#[jsonapi(relationships)]
	pub relationships: Option<Relationships>,

	pub body: String,

	#[serde(skip)]
	#[jsonapi(to_one)]
	pub author: Option<Handle<Person>>,

	#[serde(skip)]
	#[jsonapi(to_one)]
	pub article: Option<Handle<Article>>,
}

/// Declares its author as a comment, which never matches a `people` resource.
#[derive(Debug, Default, Serialize, Deserialize, Resource)]
#[jsonapi(type = "posts")]
#[serde(default)]
pub struct Post {
	#[serde(skip)]
	#[jsonapi(id)]
	pub id: Option<String>,

	#[serde(skip)]
	#[jsonapi(relationships)]
	pub relationships: Option<Relationships>,

	#[serde(skip)]
	#[jsonapi(to_one = "author")]
	pub author: Option<Handle<Comment>>,
}

pub fn api() -> JsonApi {
	JsonApi::builder()
		.register::<Article>()
		.register::<Person>()
		.register::<Comment>()
		.build()
		.unwrap()
}

pub fn person(id: &str, first_name: &str) -> Handle<Person> {
	Handle::new(Person {
		id: Some(id.to_string()),
		first_name: first_name.to_string(),
		..Default::default()
	})
}

pub fn comment(id: &str, body: &str, author: Option<Handle<Person>>) -> Handle<Comment> {
	Handle::new(Comment {
		id: Some(id.to_string()),
		body: body.to_string(),
		author,
		..Default::default()
	})
}

pub fn article(id: &str, title: &str) -> Handle<Article> {
	Handle::new(Article {
		id: Some(id.to_string()),
		title: title.to_string(),
		..Default::default()
	})
}

/// `(type, id)` pairs of the `included` member of an encoded document.
pub fn included_ids(document: &Value) -> Vec<(String, String)> {
	let mut ids: Vec<_> = document["included"]
		.as_array()
		.into_iter()
		.flatten()
		.map(|resource| {
			(
				resource["type"].as_str().unwrap_or_default().to_string(),
				resource["id"].as_str().unwrap_or_default().to_string(),
			)
		})
		.collect();

	ids.sort();
	ids
}

/// Compound document with an article, its author and two comments.
pub fn article_document() -> Value {
	json!({
		"links": { "self": "http://example.com/articles" },
		"data": {
			"type": "articles",
			"id": "1",
			"attributes": { "title": "JSON:API paints my bikeshed!" },
			"links": { "self": "http://example.com/articles/1" },
			"relationships": {
				"author": {
					"links": { "related": "http://example.com/articles/1/author" },
					"data": { "type": "people", "id": "9" }
				},
				"comments": {
					"data": [
						{ "type": "comments", "id": "5" },
						{ "type": "comments", "id": "12" }
					]
				}
			}
		},
		"included": [
			{
				"type": "people",
				"id": "9",
				"attributes": { "firstName": "Dan", "lastName": "Gebhardt", "twitter": "dgeb" }
			},
			{
				"type": "comments",
				"id": "5",
				"attributes": { "body": "First!" },
				"relationships": { "author": { "data": { "type": "people", "id": "2" } } }
			},
			{
				"type": "comments",
				"id": "12",
				"attributes": { "body": "I like XML better" },
				"relationships": { "author": { "data": { "type": "people", "id": "9" } } }
			}
		]
	})
}
