//! Core types for the record shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod options;
pub mod price;
pub mod role;

pub use id::*;
pub use options::{DeliveryType, PaymentMethod, UnknownOption};
pub use price::{Price, PriceError};
pub use role::UserRole;
