//! Branchlink - typed schema objects and wire codec for the Branch.io API
//!
//! Branchlink models the Branch.io deep-linking API as a set of typed
//! attribute bags with a bidirectional wire codec. Every schema object
//! (link descriptor, link payload data, social-preview blocks, application
//! configuration) shares one mechanism: a schema-described entity whose
//! fields are resolved through an attribute router with delegation, and
//! encoded/decoded through a recursive codec with per-field coercions.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`schema`] - Field specs, flyweight enum constants, and the attribute
//!   router with delegation
//! - [`wire`] - Recursive encode/decode between entities and wire payloads
//! - [`link`] - Link descriptor, link data, and social-preview schemas
//! - [`app`] - Application configuration schema
//! - [`transport`] - HTTP transport collaborator (thin glue, no policy)
//! - [`client`] - API client façade wiring codec and transport together
//!
//! # Correctness Invariants
//!
//! 1. Enum constants are identity-stable: the same `(type, value)` pair
//!    always yields the same `&'static` instance
//! 2. Name resolution across a delegation chain is total: a name resolves
//!    to exactly one owner or fails explicitly
//! 3. `decode(encode(e))` restores every field whose coercion is bijective
//! 4. The core never retries, never logs, and never swallows an error
//!
//! # Example
//!
//! ```
//! use branchlink::link::Link;
//! use branchlink::schema::FieldValue;
//!
//! let mut link = Link::new().channel("email").feature("sharing");
//! // Fields owned by nested sub-objects resolve through delegation.
//! link.set("og_title", FieldValue::from("My title")).unwrap();
//!
//! let payload = link.build();
//! assert_eq!(payload["channel"], "email");
//! assert_eq!(payload["data"]["$og_title"], "My title");
//! ```

pub mod app;
pub mod client;
pub mod link;
pub mod schema;
pub mod transport;
pub mod wire;

pub use client::{BranchClient, ClientError};
