//! HTTP surface for the admin service.
//!
//! Thin axum layer over the [`admin`] handlers: bearer-token
//! authentication resolves the principal, create/update take form bodies,
//! and the delete endpoints accept `nid` (single id) or repeated `id`
//! fields and always answer 200 with `{"status": ..., "error": ...}`.

mod auth;
mod error;
mod routes;

pub use auth::{Authenticator, TokenAuthenticator};
pub use error::ApiError;
pub use routes::{router, serve, ServerState};
