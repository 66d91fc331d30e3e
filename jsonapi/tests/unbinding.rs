mod common;

use common::*;
use jsonapi::{Document, Handle, Included, JsonApi, Relationships, Resource};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Holds its comments in a plain vector, which has no unset state.
#[derive(Debug, Default, Serialize, Deserialize, Resource)]
#[jsonapi(type = "shelves")]
#[serde(default)]
struct Shelf {
	#[serde(skip)]
	#[jsonapi(id)]
	id: Option<String>,

	#[serde(skip)]
	#[jsonapi(relationships)]
	relationships: Option<Relationships>,

	#[serde(skip)]
	#[jsonapi(to_many)]
	comments: Vec<Handle<Comment>>,
}

fn pair(resource_type: &str, id: &str) -> (String, String) {
	(resource_type.to_string(), id.to_string())
}

#[test]
fn includes_transitively_reachable_resources() {
	let dan = person("9", "Dan");
	let other = person("2", "Other");
	let first = comment("5", "First!", Some(other.clone()));

	let article = article("1", "Bikeshed");
	article.write().author = Some(dan.clone());
	article.write().comments = Some(vec![first.clone()]);

	let value = api().to_value(&Document::new(article.clone())).unwrap();

	assert_eq!(
		included_ids(&value),
		[pair("comments", "5"), pair("people", "2"), pair("people", "9")]
	);

	assert_eq!(
		value["data"]["relationships"],
		json!({
			"author": { "data": { "type": "people", "id": "9" } },
			"comments": { "data": [{ "type": "comments", "id": "5" }] }
		})
	);
	assert_eq!(
		value["data"]["attributes"],
		json!({ "title": "Bikeshed" })
	);
}

#[test]
fn encoding_restores_the_caller_graph() {
	let dan = person("9", "Dan");
	let article = article("1", "Bikeshed");
	article.write().author = Some(dan.clone());

	api().encode(&Document::new(article.clone())).unwrap();

	let article = article.read();
	assert!(article.author.as_ref().unwrap().ptr_eq(&dan));
}

#[test]
fn empty_included_is_omitted() {
	let value = api().to_value(&Document::new(article("1", "Alone"))).unwrap();

	assert!(value.get("included").is_none());
	assert!(value["data"].get("relationships").is_none());
}

#[test]
fn null_data_encodes_without_included() {
	let document = Document::<Handle<Article>>::null();
	assert_eq!(api().to_value(&document).unwrap(), json!({ "data": null }));
}

#[test]
fn unbinding_twice_changes_nothing() {
	let dan = person("9", "Dan");
	let article = article("1", "Bikeshed");
	article.write().author = Some(dan.clone());
	article.write().comments = Some(vec![comment("5", "Hi", Some(dan.clone()))]);

	let mut document = Document::new(article.clone());
	document.unbind().unwrap();
	let relationships = article.read().relationships.clone();
	let included: Vec<_> = document
		.included()
		.unwrap()
		.iter()
		.map(|h| h.identifier().unwrap())
		.collect();

	document.unbind().unwrap();
	assert_eq!(article.read().relationships, relationships);
	assert_eq!(
		document
			.included()
			.unwrap()
			.iter()
			.map(|h| h.identifier().unwrap())
			.collect::<Vec<_>>(),
		included
	);

	assert!(article.read().author.is_none());
	assert_eq!(included.len(), 2);
}

#[test]
fn cyclic_graphs_terminate() {
	let article = article("1", "Cycle");
	let reply = comment("5", "Reply", None);
	reply.write().article = Some(article.clone());
	article.write().comments = Some(vec![reply.clone()]);

	let value = api().to_value(&Document::new(article.clone())).unwrap();
	assert_eq!(included_ids(&value), [pair("comments", "5")]);
	assert_eq!(
		value["included"][0]["relationships"]["article"],
		json!({ "data": { "type": "articles", "id": "1" } })
	);

	assert!(reply.read().article.as_ref().unwrap().ptr_eq(&article));
}

#[test]
fn round_trip_preserves_the_graph() {
	let api = api();
	let dan = person("9", "Dan");
	let article = article("1", "Bikeshed");
	article.write().author = Some(dan.clone());
	article.write().comments = Some(vec![
		comment("5", "First!", Some(dan.clone())),
		comment("12", "Second", None),
	]);

	let encoded = api.encode(&Document::new(article)).unwrap();
	let document: Document<Handle<Article>> = api.decode(&encoded).unwrap();

	let article = document.data().unwrap().read();
	let author = article.author.clone().unwrap();
	assert_eq!(author.read().first_name, "Dan");

	let comments = article.comments.as_ref().unwrap();
	assert_eq!(comments.len(), 2);
	assert!(comments[0].read().author.as_ref().unwrap().ptr_eq(&author));
	assert!(comments[1].read().author.is_none());
}

#[test]
fn declared_included_policy_skips_unbinding() {
	let dan = person("9", "Dan");
	let article = article("1", "Bikeshed");
	article.write().author = Some(dan.clone());

	let document = Document::builder()
		.data(article)
		.included(vec![dan.to_any()])
		.included_policy(Included::Declared)
		.build()
		.unwrap();

	let value = api().to_value(&document).unwrap();
	assert_eq!(included_ids(&value), [pair("people", "9")]);

	assert_eq!(
		value["data"]["relationships"]["author"],
		json!({ "data": { "type": "people", "id": "9" } })
	);
	assert!(article_is_bound(&document));
}

fn article_is_bound(document: &Document<Handle<Article>>) -> bool {
	document.data().unwrap().read().author.is_some()
}

#[test]
fn failed_encoding_leaves_the_graph_untouched() {
	let dan = person("9", "Dan");
	let anonymous = Handle::new(Person::default());
	let first = comment("5", "First!", Some(anonymous.clone()));

	let article = article("1", "Bikeshed");
	article.write().author = Some(dan.clone());
	article.write().comments = Some(vec![first.clone()]);

	assert!(api().encode(&Document::new(article.clone())).is_err());

	let article = article.read();
	assert!(article.author.as_ref().unwrap().ptr_eq(&dan));
	assert!(article.relationships.is_none());

	let comments = article.comments.as_ref().unwrap();
	assert_eq!(comments.len(), 1);
	assert!(comments[0].ptr_eq(&first));
	assert!(first.read().author.as_ref().unwrap().ptr_eq(&anonymous));
}

#[test]
fn cleared_to_many_members_drop_the_relationship() {
	let api = JsonApi::builder()
		.register::<Shelf>()
		.register::<Person>()
		.register::<Comment>()
		.build()
		.unwrap();

	let value = json!({
		"data": {
			"type": "shelves",
			"id": "1",
			"relationships": { "comments": { "data": [{ "type": "comments", "id": "5" }] } }
		},
		"included": [{ "type": "comments", "id": "5", "attributes": { "body": "Hi" } }]
	});

	let document: Document<Handle<Shelf>> = api.from_value(value).unwrap();
	let shelf = document.into_data().unwrap();
	assert_eq!(shelf.read().comments.len(), 1);

	shelf.write().comments.clear();
	let value = api.to_value(&Document::new(shelf.clone())).unwrap();

	assert!(value["data"].get("relationships").is_none());
	assert!(value.get("included").is_none());
	assert!(shelf.read().comments.is_empty());
}

#[test]
fn empty_to_many_members_are_not_written() {
	let article = article("1", "Quiet");
	article.write().comments = Some(Vec::new());

	let value = api().to_value(&Document::new(article)).unwrap();
	assert!(value["data"].get("relationships").is_none());
}
