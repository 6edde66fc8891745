//! HTTP Layer
//!
//! Routes and request handlers for the REST API.

pub mod handlers;
pub mod routes;
