// ============================================================================
// Domain Layer - Order Document Model & Validation
// ============================================================================
//
// The validated data shape of an inbound order submission and the structural
// rules that gate it. This layer knows nothing about HTTP or the broker.
// ============================================================================

mod order;
mod validation;

pub use order::{Address, Customer, Order, OrderItem, PaymentDetails, PaymentMethod};
pub use validation::{validate, Violation};

// ============================================================================
// Shared test fixtures
// ============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    use super::Order;

    pub fn address() -> Value {
        json!({
            "street": "1 Market St",
            "city": "Springfield",
            "state": "SP",
            "zipCode": "12345-678",
            "country": "Freedonia"
        })
    }

    /// A fully valid raw order document in wire form.
    pub fn document() -> Value {
        json!({
            "orderId": "123e4567-e89b-12d3-a456-426614174000",
            "customer": {
                "customerId": "cust-1",
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "billingAddress": address(),
                "shippingAddress": address()
            },
            "items": [
                {
                    "productId": "prod-1",
                    "productName": "Widget",
                    "unitPrice": 99.90,
                    "quantity": 2
                },
                {
                    "productId": "prod-2",
                    "productName": "Gadget",
                    "unitPrice": 49.50,
                    "quantity": 1
                }
            ],
            "shippingAddress": address(),
            "billingAddress": address(),
            "payment": {
                "method": "CreditCard",
                "transactionId": "txn-42",
                "paidAt": "2024-05-01T10:00:00Z"
            },
            "orderDate": "2024-05-01T09:59:00Z"
        })
    }

    /// The typed counterpart of [`document`].
    pub fn order() -> Order {
        super::validate(&document()).expect("fixture document is valid")
    }
}
