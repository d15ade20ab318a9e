use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Order Document Model
// ============================================================================
//
// The validated shape of an inbound order submission. Instances are built by
// the validator, wrapped into a publish envelope, and discarded once the
// publish call returns; nothing here is persisted or mutated in place.
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub billing_address: Address,
    pub shipping_address: Address,
}

/// Accepted payment methods, serialized by wire name ("CreditCard", ...),
/// never as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    PayPal,
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    pub const WIRE_NAMES: [&'static str; 5] =
        ["CreditCard", "DebitCard", "PayPal", "BankTransfer", "Cash"];

    /// Case-sensitive lookup by wire name.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "CreditCard" => Some(Self::CreditCard),
            "DebitCard" => Some(Self::DebitCard),
            "PayPal" => Some(Self::PayPal),
            "BankTransfer" => Some(Self::BankTransfer),
            "Cash" => Some(Self::Cash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub transaction_id: String,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    // Exact JSON number on the wire; binary floats would drift on money math.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment: PaymentDetails,
    pub order_date: DateTime<Utc>,
}

impl Order {
    /// Sum of unit_price × quantity across all items, in exact decimal
    /// arithmetic. Computed on demand, never stored or serialized.
    pub fn total_amount(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
