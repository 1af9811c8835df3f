//! Spreadsheet import and export for Certa.
//!
//! - [`import`] reads the first sheet of an `.xlsx`/`.xls` workbook into
//!   certificate fields and forwards them to a bulk create.
//! - [`export`] writes a selection of certificates to a workbook and fetches
//!   one QR image per certificate through a [`export::QrImageSource`].
//! - [`qr`] builds requests against the external QR image endpoint.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod export;
pub mod import;
pub mod qr;

pub use error::{Error, Result};
