//! Core types and trait definitions for the Certa certificate service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; storage backends implement
//! [`store::CertificateStore`] and everything else goes through
//! [`service::CertificateService`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access_code;
pub mod actor;
pub mod certificate;
pub mod error;
pub mod service;
pub mod store;
pub mod viewer;

pub use error::{Error, Result};
