#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Caller identity for hyperkit.
//!
//! A [`SecurityContext`] is placed in the request extensions by the
//! authentication layer and resolved by the route composer as the
//! always-present identity capability. Permission evaluators receive it
//! to decide which operations a caller may see and invoke.

pub mod context;

pub use context::{SecurityContext, SecurityContextBuilder, WILDCARD_SCOPE};
