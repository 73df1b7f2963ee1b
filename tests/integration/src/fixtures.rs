//! Request payloads for integration tests

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per process and per call, so reruns against one database don't collide
pub fn unique_suffix() -> String {
    format!(
        "{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

pub const PASSWORD: &str = "bazaar2024";

pub fn register_payload(first_name: &str) -> Value {
    json!({
        "email": format!("{}.{}@example.com", first_name.to_lowercase(), unique_suffix()),
        "password": PASSWORD,
        "first_name": first_name,
        "last_name": "Tester",
    })
}

pub fn listing_payload(title: &str) -> Value {
    json!({
        "title": title,
        "description": "In good shape, collection from Baku centre",
        "price": "250.00",
        "currency": "AZN",
        "condition": "used",
        "location": "Baku",
    })
}

pub fn category_payload(name: &str) -> Value {
    json!({ "name": format!("{name} {}", unique_suffix()) })
}
