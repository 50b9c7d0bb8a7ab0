//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::net::TcpListener;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use storefront::api::{ApiGateway, Product};
use storefront::config::ApiConfig;
use storefront::persist::{MemoryStorage, Storage};
use storefront::Storefront;

/// Find an available port for testing.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        connect_timeout_seconds: 2,
    }
}

pub fn gateway(base_url: &str) -> ApiGateway {
    ApiGateway::new(&api_config(base_url)).expect("Failed to build gateway")
}

/// Boot a container against `base_url` on top of `storage`.
pub fn boot(base_url: &str, storage: Arc<dyn Storage>) -> Storefront {
    Storefront::boot(gateway(base_url), storage)
}

pub fn memory_storage() -> Arc<dyn Storage> {
    Arc::new(MemoryStorage::new())
}

pub fn product(id: &str, price: &str) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        price: Decimal::from_str(price).unwrap(),
        description: None,
        image_url: Some(format!("https://img.example.com/{id}.png")),
        category: Some("misc".to_string()),
        stock: Some(10),
    }
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}
