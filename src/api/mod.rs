//! Gateway to the storefront REST service.
//!
//! Endpoint modules only describe requests; [`ApiGateway`] sends them and
//! normalizes every failure into [`ApiError`].

pub mod admin;
pub mod auth;
pub mod categories;
pub mod client;
pub mod error;
pub mod products;
pub mod types;

pub use client::{ApiGateway, ApiRequest};
pub use error::ApiError;
pub use products::{ImageUpload, ProductForm};
pub use types::{
    Activity, AuthResponse, Category, Credentials, DashboardStats, MessageResponse, Product,
    SignupRequest, User,
};
