#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Single-resource documents: sparse fieldsets, embedding and mapper choice.

mod common;

use common::{Harness, ada, request};
use http::HeaderValue;
use http::header::ACCEPT;
use hyperkit::routes::SingleModel;
use hyperkit::writer::SingleModelWriter;
use hyperkit::WriterContext;
use serde_json::json;

#[test]
fn sparse_fieldset_keeps_only_named_fields() {
    let harness = Harness::new();
    let request = request("fields[Person]=name");
    let ctx = WriterContext::new(&harness.catalog, &harness.mappers, &harness.config, &request)
        .with_media_type("application/json");

    let written = SingleModelWriter::new(&ctx)
        .write(&SingleModel::new(ada(), Vec::new()))
        .unwrap();

    assert_eq!(
        written.document(),
        &json!({
            "name": "Ada",
            "self": "http://localhost/api/people/1",
            "types": ["Person"]
        })
    );
}

#[test]
fn relationship_is_linked_unless_embedded() {
    let harness = Harness::new();

    let linked_request = request("");
    let ctx = WriterContext::new(
        &harness.catalog,
        &harness.mappers,
        &harness.config,
        &linked_request,
    )
    .with_media_type("application/json");
    let linked = SingleModelWriter::new(&ctx)
        .write(&SingleModel::new(ada(), Vec::new()))
        .unwrap();

    assert_eq!(
        linked.document()["employer"],
        json!("http://localhost/api/companies/acme")
    );
    assert_eq!(
        linked.document()["friends"],
        json!("http://localhost/api/people/1/friends")
    );
    assert_eq!(linked.document()["age"], json!(36));

    let embedded_request = request("embedded=employer");
    let ctx = WriterContext::new(
        &harness.catalog,
        &harness.mappers,
        &harness.config,
        &embedded_request,
    )
    .with_media_type("application/json");
    let embedded = SingleModelWriter::new(&ctx)
        .write(&SingleModel::new(ada(), Vec::new()))
        .unwrap();

    assert_eq!(
        embedded.document()["employer"],
        json!({
            "name": "Acme Corp",
            "types": ["Company", "Organization"],
            "self": "http://localhost/api/companies/acme"
        })
    );
}

#[test]
fn hal_never_writes_a_relationship_twice() {
    let harness = Harness::new();
    let request = request("embedded=employer");
    let ctx = WriterContext::new(&harness.catalog, &harness.mappers, &harness.config, &request);

    let written = SingleModelWriter::new(&ctx)
        .write(&SingleModel::new(ada(), Vec::new()))
        .unwrap();
    let doc = written.document();

    assert_eq!(written.media_type(), "application/hal+json");
    assert_eq!(doc["_embedded"]["employer"]["name"], json!("Acme Corp"));
    assert_eq!(
        doc["_embedded"]["employer"]["_links"]["self"]["href"],
        json!("http://localhost/api/companies/acme")
    );
    assert!(doc["_links"].get("employer").is_none());
    assert!(doc.get("types").is_none());
}

#[test]
fn fieldset_on_embedded_type_applies_inside_it() {
    let harness = Harness::new();
    let request = request("embedded=employer&fields[Organization]=name&fields[Person]=employer");
    let ctx = WriterContext::new(&harness.catalog, &harness.mappers, &harness.config, &request)
        .with_media_type("application/json");

    let written = SingleModelWriter::new(&ctx)
        .write(&SingleModel::new(ada(), Vec::new()))
        .unwrap();

    assert_eq!(
        written.document(),
        &json!({
            "employer": {
                "name": "Acme Corp",
                "types": ["Company", "Organization"],
                "self": "http://localhost/api/companies/acme"
            },
            "self": "http://localhost/api/people/1",
            "types": ["Person"]
        })
    );
}

#[test]
fn unknown_media_type_falls_back_to_default_mapper() {
    let harness = Harness::new();
    let request = request("").with_header(ACCEPT, HeaderValue::from_static("text/csv"));
    let ctx = WriterContext::new(&harness.catalog, &harness.mappers, &harness.config, &request);

    let written = SingleModelWriter::new(&ctx)
        .write(&SingleModel::new(ada(), Vec::new()))
        .unwrap();

    assert_eq!(ctx.media_type(), "application/hal+json");
    assert_eq!(written.media_type(), "application/hal+json");
    assert!(written.document().get("_links").is_some());

    let forced = WriterContext::new(&harness.catalog, &harness.mappers, &harness.config, &request)
        .with_media_type("text/csv");
    let written = SingleModelWriter::new(&forced)
        .write(&SingleModel::new(ada(), Vec::new()))
        .unwrap();
    assert_eq!(written.media_type(), "application/hal+json");
}
