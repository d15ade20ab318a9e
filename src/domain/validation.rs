use chrono::DateTime;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::LazyLock;

use super::order::{Order, PaymentMethod};

// ============================================================================
// Order Document Validation
// ============================================================================
//
// Structural validation of the raw inbound JSON document. Every rule runs and
// every violation is collected, so one request yields the complete picture
// rather than the first failing field. Violations address fields by wire
// path, e.g. `items[1].quantity` or `customer.billingAddress.zipCode`.
//
// Only a document with zero violations is deserialized into the typed Order.
// ============================================================================

// Contract pattern: exactly 5 digits, optional hyphen, exactly 3 digits.
// Unusual for real postal codes, but fixed by the wire contract.
static ZIP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}-?\d{3}$").expect("zip code pattern is valid"));

/// One failed validation rule, addressed by wire field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Validate a raw order document.
///
/// Returns the typed [`Order`] when every rule passes, otherwise the full
/// ordered list of violations. Never short-circuits on the first failure.
pub fn validate(document: &Value) -> Result<Order, Vec<Violation>> {
    let mut violations = Vec::new();
    check_order(document, &mut violations);
    if !violations.is_empty() {
        return Err(violations);
    }

    serde_json::from_value(document.clone())
        .map_err(|e| vec![Violation::new("$", format!("Malformed order document: {e}"))])
}

fn check_order(doc: &Value, out: &mut Vec<Violation>) {
    if !doc.is_object() {
        out.push(Violation::new("$", "Order document must be a JSON object."));
        return;
    }

    required_string(doc, "", "orderId", "OrderId", out);

    if let Some(customer) = required_object(doc, "", "customer", "Customer", out) {
        check_customer(customer, "customer", out);
    }

    check_items(doc, out);

    if let Some(addr) = required_object(doc, "", "shippingAddress", "ShippingAddress", out) {
        check_address(addr, "shippingAddress", out);
    }
    if let Some(addr) = required_object(doc, "", "billingAddress", "BillingAddress", out) {
        check_address(addr, "billingAddress", out);
    }

    if let Some(payment) = required_object(doc, "", "payment", "Payment", out) {
        check_payment(payment, "payment", out);
    }

    required_timestamp(doc, "", "orderDate", "OrderDate", out);
}

fn check_customer(obj: &Value, path: &str, out: &mut Vec<Violation>) {
    required_string(obj, path, "customerId", "CustomerId", out);
    required_string(obj, path, "name", "Name", out);

    if let Some(email) = required_string(obj, path, "email", "Email", out) {
        if !is_valid_email(email) {
            out.push(Violation::new(join(path, "email"), "Invalid email format."));
        }
    }

    if let Some(addr) = required_object(obj, path, "billingAddress", "BillingAddress", out) {
        check_address(addr, &join(path, "billingAddress"), out);
    }
    if let Some(addr) = required_object(obj, path, "shippingAddress", "ShippingAddress", out) {
        check_address(addr, &join(path, "shippingAddress"), out);
    }
}

fn check_address(obj: &Value, path: &str, out: &mut Vec<Violation>) {
    required_string(obj, path, "street", "Street", out);
    required_string(obj, path, "city", "City", out);
    required_string(obj, path, "state", "State", out);
    required_string(obj, path, "country", "Country", out);

    if let Some(zip) = required_string(obj, path, "zipCode", "ZipCode", out) {
        if !ZIP_CODE.is_match(zip) {
            out.push(Violation::new(
                join(path, "zipCode"),
                "Invalid ZipCode format.",
            ));
        }
    }
}

fn check_items(doc: &Value, out: &mut Vec<Violation>) {
    match doc.get("items") {
        None | Some(Value::Null) => {
            out.push(Violation::new("items", "Items are required."));
        }
        Some(Value::Array(items)) => {
            if items.is_empty() {
                out.push(Violation::new("items", "At least one OrderItem is required."));
                return;
            }
            for (index, item) in items.iter().enumerate() {
                let path = format!("items[{index}]");
                if item.is_object() {
                    check_item(item, &path, out);
                } else {
                    out.push(Violation::new(path, "OrderItem must be an object."));
                }
            }
        }
        Some(_) => {
            out.push(Violation::new("items", "Items must be an array."));
        }
    }
}

fn check_item(obj: &Value, path: &str, out: &mut Vec<Violation>) {
    required_string(obj, path, "productId", "ProductId", out);
    required_string(obj, path, "productName", "ProductName", out);

    match obj.get("unitPrice") {
        None | Some(Value::Null) => {
            out.push(Violation::new(join(path, "unitPrice"), "UnitPrice is required."));
        }
        Some(Value::Number(n)) => match Decimal::from_str(&n.to_string()) {
            // Strict lower bound: 0.01 itself is rejected.
            Ok(price) if price > Decimal::new(1, 2) => {}
            Ok(_) => out.push(Violation::new(
                join(path, "unitPrice"),
                "UnitPrice must be greater than zero.",
            )),
            Err(_) => out.push(Violation::new(
                join(path, "unitPrice"),
                "UnitPrice must be a decimal number.",
            )),
        },
        Some(_) => {
            out.push(Violation::new(
                join(path, "unitPrice"),
                "UnitPrice must be a decimal number.",
            ));
        }
    }

    match obj.get("quantity") {
        None | Some(Value::Null) => {
            out.push(Violation::new(join(path, "quantity"), "Quantity is required."));
        }
        Some(Value::Number(n)) => match n.as_i64() {
            Some(q) if q < 1 => out.push(Violation::new(
                join(path, "quantity"),
                "Quantity must be at least 1.",
            )),
            Some(q) if q > i64::from(u32::MAX) => out.push(Violation::new(
                join(path, "quantity"),
                "Quantity is out of range.",
            )),
            Some(_) => {}
            None => out.push(Violation::new(
                join(path, "quantity"),
                "Quantity must be an integer.",
            )),
        },
        Some(_) => {
            out.push(Violation::new(
                join(path, "quantity"),
                "Quantity must be an integer.",
            ));
        }
    }
}

fn check_payment(obj: &Value, path: &str, out: &mut Vec<Violation>) {
    match obj.get("method") {
        None | Some(Value::Null) => {
            out.push(Violation::new(join(path, "method"), "Method is required."));
        }
        Some(Value::String(name)) => {
            if PaymentMethod::from_wire_name(name).is_none() {
                out.push(Violation::new(
                    join(path, "method"),
                    format!(
                        "Method must be one of: {}.",
                        PaymentMethod::WIRE_NAMES.join(", ")
                    ),
                ));
            }
        }
        Some(_) => {
            out.push(Violation::new(join(path, "method"), "Method must be a string."));
        }
    }

    required_string(obj, path, "transactionId", "TransactionId", out);
    required_timestamp(obj, path, "paidAt", "PaidAt", out);
}

// ============================================================================
// Field-level rule helpers
// ============================================================================

fn join(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

/// Required non-empty string field. Returns the value so dependent rules
/// (format checks) can run on it.
fn required_string<'a>(
    obj: &'a Value,
    parent: &str,
    field: &str,
    label: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a str> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            out.push(Violation::new(join(parent, field), format!("{label} is required.")));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            out.push(Violation::new(join(parent, field), format!("{label} is required.")));
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            out.push(Violation::new(
                join(parent, field),
                format!("{label} must be a string."),
            ));
            None
        }
    }
}

fn required_object<'a>(
    obj: &'a Value,
    parent: &str,
    field: &str,
    label: &str,
    out: &mut Vec<Violation>,
) -> Option<&'a Value> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            out.push(Violation::new(join(parent, field), format!("{label} is required.")));
            None
        }
        Some(value @ Value::Object(_)) => Some(value),
        Some(_) => {
            out.push(Violation::new(
                join(parent, field),
                format!("{label} must be an object."),
            ));
            None
        }
    }
}

fn required_timestamp(obj: &Value, parent: &str, field: &str, label: &str, out: &mut Vec<Violation>) {
    match obj.get(field) {
        None | Some(Value::Null) => {
            out.push(Violation::new(join(parent, field), format!("{label} is required.")));
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            out.push(Violation::new(join(parent, field), format!("{label} is required.")));
        }
        Some(Value::String(s)) => {
            if DateTime::parse_from_rfc3339(s).is_err() {
                out.push(Violation::new(
                    join(parent, field),
                    format!("Invalid {label} format."),
                ));
            }
        }
        Some(_) => {
            out.push(Violation::new(
                join(parent, field),
                format!("{label} must be an RFC 3339 timestamp."),
            ));
        }
    }
}

fn is_valid_email(value: &str) -> bool {
    // Syntactic check only: one '@', neither first nor last character.
    let mut parts = value.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        _ => false,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
