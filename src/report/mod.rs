//! HTTP-facing report module: multipart form parsing, request/response
//! models, and the actix handlers wrapping the assembly engine.

pub mod form;
pub mod handlers;
pub mod models;
