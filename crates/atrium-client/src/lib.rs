// Typed REST client for the Atrium admin API.
//
// Each repository-equivalent server operation is bound to exactly one typed
// async method on a per-entity sub-client. The bindings are stateless: no
// caching, no retries, no invalidation. Consumers own those policies.
//
// Not-found semantics: single-entity lookups return `Ok(None)` on 404; every
// other non-success status surfaces as `ClientError::Api` with the server's
// structured error body.
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::AdminClient;
pub use config::ClientConfig;
pub use error::ClientError;
