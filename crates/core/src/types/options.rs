//! Checkout and point-of-sale options.
//!
//! The wire values are the Spanish identifiers the shop API expects.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an option from an unknown string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownOption {
    /// Which option was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// How a customer order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryType {
    /// Collected at the shop counter.
    #[default]
    #[serde(rename = "retiro")]
    Pickup,
    /// Shipped to the customer's address.
    #[serde(rename = "envio")]
    Shipping,
}

impl DeliveryType {
    /// Wire identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pickup => "retiro",
            Self::Shipping => "envio",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retiro" | "pickup" => Ok(Self::Pickup),
            "envio" | "shipping" => Ok(Self::Shipping),
            _ => Err(UnknownOption {
                kind: "delivery type",
                value: s.to_owned(),
            }),
        }
    }
}

/// Payment method recorded on a POS sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "efectivo")]
    Cash,
    #[serde(rename = "tarjeta")]
    Card,
    #[serde(rename = "transferencia")]
    Transfer,
}

impl PaymentMethod {
    /// Wire identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "efectivo",
            Self::Card => "tarjeta",
            Self::Transfer => "transferencia",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "efectivo" | "cash" => Ok(Self::Cash),
            "tarjeta" | "card" => Ok(Self::Card),
            "transferencia" | "transfer" => Ok(Self::Transfer),
            _ => Err(UnknownOption {
                kind: "payment method",
                value: s.to_owned(),
            }),
        }
    }
}
