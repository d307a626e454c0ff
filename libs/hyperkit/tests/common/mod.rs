#![allow(dead_code)]

//! Shared fixtures: people working for companies.

use hyperkit::{
    Catalog, HyperkitConfig, Mappers, Providers, Representor, RequestContext, SecurityContext,
};
use url::Url;

pub const BASE_URL: &str = "http://localhost/api/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub employer: Option<Company>,
}

pub fn acme() -> Company {
    Company {
        id: "acme".to_owned(),
        name: "Acme Corp".to_owned(),
    }
}

pub fn ada() -> Person {
    Person {
        id: "1".to_owned(),
        name: "Ada".to_owned(),
        age: 36,
        employer: Some(acme()),
    }
}

pub fn person(id: &str, name: &str) -> Person {
    Person {
        id: id.to_owned(),
        name: name.to_owned(),
        age: 30,
        employer: None,
    }
}

pub fn person_schema() -> Representor {
    Representor::builder::<Person>()
        .types(&["Person"])
        .identifier(|p| p.id.clone())
        .field("name", |p| p.name.clone())
        .field("age", |p| p.age)
        .related::<Company, _>("employer", |p| p.employer.clone())
        .related_collection::<Person>("friends")
        .build()
        .unwrap()
}

pub fn company_schema() -> Representor {
    Representor::builder::<Company>()
        .types(&["Company", "Organization"])
        .identifier(|c| c.id.clone())
        .field("name", |c| c.name.clone())
        .build()
        .unwrap()
}

pub fn catalog() -> Catalog {
    Catalog::builder()
        .resource("people", person_schema())
        .unwrap()
        .resource("companies", company_schema())
        .unwrap()
        .build()
}

pub fn request(query: &str) -> RequestContext {
    RequestContext::new(Url::parse(BASE_URL).unwrap()).with_query(query)
}

pub fn signed_in(request: RequestContext, identity: SecurityContext) -> RequestContext {
    request.with_extension(identity)
}

pub fn editor() -> SecurityContext {
    SecurityContext::builder()
        .subject_id(uuid::Uuid::new_v4())
        .role("editor")
        .build()
}

/// Everything a test needs besides the request.
pub struct Harness {
    pub catalog: Catalog,
    pub mappers: Mappers,
    pub config: HyperkitConfig,
    pub providers: Providers,
}

impl Harness {
    pub fn new() -> Self {
        let config = HyperkitConfig::default();
        let mappers = Mappers::reference();
        mappers.validate(&config.default_media_type).unwrap();
        Self {
            catalog: catalog(),
            mappers,
            providers: Providers::with_defaults(&config),
            config,
        }
    }
}
