//! HTTP middleware applied to every route.

pub mod request_id;

pub use request_id::{create_request_id_layers, UuidRequestIdGenerator, X_REQUEST_ID};
