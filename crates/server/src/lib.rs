//! HTTP front end for the CEP race dispatcher.
//!
//! `GET /consulta?cep=<code>` races every configured source through
//! [`cep_core::RaceDispatcher`] and returns the winning envelope as JSON.

pub mod middleware;
pub mod router;
