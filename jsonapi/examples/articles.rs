use jsonapi::{Document, Handle, JsonApi, Links, Relationships, Resource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Resource)]
#[jsonapi(type = "articles")]
#[serde(default)]
struct Article {
	#[serde(skip)]
	#[jsonapi(id)]
	id: Option<String>,

	#[serde(skip)]
	#[jsonapi(relationships)]
	relationships: Option<Relationships>,

	#[serde(skip)]
	#[jsonapi(links)]
	links: Option<Links>,

	title: String,

	#[serde(skip)]
	#[jsonapi(to_one = "author")]
	author: Option<Handle<Person>>,

	#[serde(skip)]
	#[jsonapi(to_many = "comments")]
	comments: Vec<Handle<Comment>>,
}

#[derive(Debug, Default, Serialize, Deserialize, Resource)]
#[jsonapi(type = "people")]
#[serde(default, rename_all = "camelCase")]
struct Person {
	#[serde(skip)]
	#[jsonapi(id)]
	id: Option<String>,

	first_name: String,
	last_name: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Resource)]
#[jsonapi(type = "comments")]
#[serde(default)]
struct Comment {
	#[serde(skip)]
	#[jsonapi(id)]
	id: Option<String>,

	#[serde(skip)]
	#[jsonapi(relationships)]
	relationships: Option<Relationships>,

	body: String,

	#[serde(skip)]
	#[jsonapi(to_one)]
	author: Option<Handle<Person>>,
}

const INPUT: &str = r#"{
	"data": {
		"type": "articles",
		"id": "1",
		"attributes": { "title": "JSON:API paints my bikeshed!" },
		"links": { "self": "http://example.com/articles/1" },
		"relationships": {
			"author": { "data": { "type": "people", "id": "9" } },
			"comments": { "data": [{ "type": "comments", "id": "5" }, { "type": "comments", "id": "12" }] }
		}
	},
	"included": [
		{ "type": "people", "id": "9", "attributes": { "firstName": "Dan", "lastName": "Gebhardt" } },
		{ "type": "comments", "id": "5", "attributes": { "body": "First!" } },
		{
			"type": "comments",
			"id": "12",
			"attributes": { "body": "I like XML better" },
			"relationships": { "author": { "data": { "type": "people", "id": "9" } } }
		}
	]
}"#;

fn main() -> Result<(), jsonapi::Error> {
	let api = JsonApi::builder()
		.register::<Article>()
		.register::<Person>()
		.register::<Comment>()
		.build()?;

	let document: Document<Handle<Article>> = api.decode(INPUT)?;
	let article = document.require_data()?;

	{
		let article = article.read();
		println!("{} ({:?})", article.title, article.id);

		if let Some(author) = &article.author {
			let author = author.read();
			println!("  by {} {}", author.first_name, author.last_name);
		}

		for comment in &article.comments {
			let comment = comment.read();
			let by = comment
				.author
				.as_ref()
				.map(|a| a.read().first_name.clone())
				.unwrap_or_else(|| "anonymous".to_string());
			println!("  comment {:?} by {by}: {}", comment.id, comment.body);
		}
	}

	let reply = Handle::new(Comment {
		id: Some("13".to_string()),
		body: "Me too".to_string(),
		author: article.read().author.clone(),
		..Default::default()
	});
	article.write().comments.push(reply);

	println!("{}", api.encode(&Document::new(article))?);
	Ok(())
}
