//! `/products` endpoints, including the multipart admin CRUD calls.

use reqwest::multipart::{Form, Part};
use rust_decimal::Decimal;

use crate::api::client::ApiRequest;

/// Image attached to a create/update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Admin product editor payload, sent as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stock: Option<u32>,
    pub image: Option<ImageUpload>,
}

impl ProductForm {
    pub fn into_multipart(self) -> Form {
        let mut form = Form::new()
            .text("name", self.name)
            .text("price", self.price.to_string());
        if let Some(description) = self.description {
            form = form.text("description", description);
        }
        if let Some(category) = self.category {
            form = form.text("category", category);
        }
        if let Some(stock) = self.stock {
            form = form.text("stock", stock.to_string());
        }
        if let Some(image) = self.image {
            form = form.part("image", Part::bytes(image.bytes).file_name(image.file_name));
        }
        form
    }
}

pub fn list() -> ApiRequest {
    ApiRequest::get(&["products"])
}

pub fn get(id: &str) -> ApiRequest {
    ApiRequest::get(&["products", id])
}

pub fn search(query: &str) -> ApiRequest {
    ApiRequest::get(&["products", "search"]).query("q", query)
}

pub fn create(form: ProductForm) -> ApiRequest {
    ApiRequest::post(&["products"]).multipart(form.into_multipart())
}

pub fn update(id: &str, form: ProductForm) -> ApiRequest {
    ApiRequest::put(&["products", id]).multipart(form.into_multipart())
}

pub fn delete(id: &str) -> ApiRequest {
    ApiRequest::delete(&["products", id])
}
