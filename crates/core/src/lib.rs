//! Record Shop Core - Shared types library.
//!
//! This crate provides common types used across all record shop components:
//! - `storefront` - Cart, catalog, reservation and checkout client library
//! - `cli` - Command-line front end for customers and the POS counter
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids, prices, roles and checkout options

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
