//! A trivial blog built on docmap: two models over in-memory drivers.
//!
//! Run with `cargo run --example blog`.

use std::sync::Arc;

use docmap::prelude::*;
use serde_json::{json, Value};

fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("object literal")
}

#[tokio::main]
async fn main() -> Result<(), docmap::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let authors = Arc::new(MemoryDriver::new());
    let posts = Arc::new(MemoryDriver::new());

    let author = Model::builder("Author")
        .schema(
            Schema::new()
                .field("name", Descriptor::string())
                .field("email", Descriptor::string())
                .field("admin", Descriptor::boolean().with_default(false)),
        )
        .driver(authors.clone())
        .primary_key("email")
        .build()?;

    let post = Model::builder("Post")
        .schema(
            Schema::new()
                .field("title", Descriptor::string().required())
                .field("content", Descriptor::string().required())
                .field("author", Descriptor::string().required())
                .field("posted", Descriptor::date().auto()),
        )
        .driver(posts.clone())
        .build()?;

    authors.seed(
        "chris@example.com",
        doc(json!({"name": "Chris", "email": "chris@example.com", "admin": true})),
    );
    authors.seed(
        "foo@bar.com",
        doc(json!({"name": "Foo Bar", "email": "foo@bar.com", "admin": true})),
    );
    posts.seed(
        "1452637592827",
        doc(json!({
            "title": "Posts, and the people who post them.",
            "content": "Placeholder text. For the future!",
            "author": "chris@example.com"
        })),
    );
    posts.seed(
        "1452637592927",
        doc(json!({
            "title": "This one weird trick to posting",
            "content": "This post intentionally left blank.",
            "author": "foo@bar.com"
        })),
    );

    let by_chris = post
        .filter(Predicate::eq("author", "chris@example.com"))
        .await?;
    println!("chris@example.com has {} post(s)", by_chris.len());

    let mut fresh = post.create(doc(json!({
        "title": "My Test",
        "content": "My battle with writing posts.",
        "author": "chris@example.com"
    })))?;
    fresh.save().await?;

    println!(
        "created post {}: {}",
        fresh.pk().expect("saved posts have a key"),
        serde_json::to_string_pretty(&fresh).expect("serializable")
    );

    let chris = author.get("chris@example.com").await?;
    println!("author: {}", serde_json::to_string(&chris).expect("serializable"));

    Ok(())
}
