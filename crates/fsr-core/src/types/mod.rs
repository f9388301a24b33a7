//! Validated value types.
//!
//! These types enforce their invariants at construction time.

mod iri;
mod server_url;

pub use iri::Iri;
pub use server_url::ServerUrl;
