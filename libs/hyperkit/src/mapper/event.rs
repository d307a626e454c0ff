//! Events the writers emit, one enum per document kind.
//!
//! Every document opens with exactly one `Start` and closes with exactly one
//! `Finish`. Events in between may come in any order and any number of times.
//! URLs are absolute.

use serde_json::Value;

use crate::catalog::ResourceDescription;
use crate::document::JsonObjectBuilder;
use crate::routes::Operation;

/// Single resource document.
#[derive(Debug)]
pub enum ModelEvent<'a> {
    Start,
    Field {
        key: &'a str,
        value: Value,
    },
    Link {
        key: &'a str,
        url: &'a str,
    },
    Types {
        types: &'a [String],
    },
    Binary {
        key: &'a str,
        url: &'a str,
    },
    SelfUrl {
        url: &'a str,
    },
    /// A related resource written inline. `document` is already complete.
    Embedded {
        key: &'a str,
        url: &'a str,
        document: JsonObjectBuilder,
    },
    /// A related resource written as a reference only.
    Linked {
        key: &'a str,
        url: &'a str,
    },
    RelatedCollection {
        key: &'a str,
        url: &'a str,
    },
    OperationStarted {
        operation: &'a Operation,
        target: &'a str,
        /// URL of the form describing the expected body.
        expects: Option<&'a str>,
    },
    OperationFinished {
        operation: &'a Operation,
    },
    Finish,
}

/// Page of a collection. Items arrive as finished sub-documents.
#[derive(Debug)]
pub enum PageEvent<'a> {
    Start,
    TotalCount(u64),
    ItemCount(usize),
    CollectionUrl(&'a str),
    FirstPage(&'a str),
    CurrentPage(&'a str),
    LastPage(&'a str),
    NextPage(&'a str),
    PreviousPage(&'a str),
    ItemStarted {
        index: usize,
    },
    ItemFinished {
        index: usize,
        document: JsonObjectBuilder,
    },
    OperationStarted {
        operation: &'a Operation,
        target: &'a str,
        expects: Option<&'a str>,
    },
    OperationFinished {
        operation: &'a Operation,
    },
    Finish,
}

/// Problem details document.
#[derive(Debug, Clone, Copy)]
pub enum ErrorEvent<'a> {
    Start,
    Type(&'a str),
    Title(&'a str),
    Status(u16),
    Detail(&'a str),
    Instance(&'a str),
    TraceId(&'a str),
    Finish,
}

/// API documentation document.
#[derive(Debug, Clone, Copy)]
pub enum DocumentationEvent<'a> {
    Start,
    Title(&'a str),
    Description(&'a str),
    Resource {
        description: &'a ResourceDescription,
        url: &'a str,
    },
    Finish,
}

/// Outcome of a batch create.
#[derive(Debug, Clone, Copy)]
pub enum BatchEvent<'a> {
    Start,
    CollectionUrl(&'a str),
    Item {
        index: usize,
        identifier: &'a str,
        url: &'a str,
    },
    Finish,
}
