//! Backend library modules.

pub mod api;
pub mod doc;
pub mod domain;
pub mod outbound;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
