//! Record Shop storefront client library.
//!
//! This crate holds the client-side state of the record shop: the durable
//! session and cart, catalog pages, the POS stock reservation model and the
//! checkout/sale submission against the shop REST API.
//!
//! # Architecture
//!
//! - [`storage`] - durable key/value store (the `localStorage` equivalent)
//! - [`session`] / [`cart`] - typed views over that store
//! - [`catalog`] / [`reservation`] - catalog pages and optimistic POS reservations
//! - [`checkout`] / [`pos`] - one-shot order and sale submission
//! - [`api`] - `reqwest` client for the REST endpoints
//! - [`state`] - everything above wired together for a front end

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod pos;
pub mod reservation;
pub mod session;
pub mod state;
pub mod storage;
