//! Wire types for the storefront REST service.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Catalog product as served by `GET /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawProduct")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCategory")]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Profile of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUser")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}

/// Body of `POST /auth/login`. Exactly one of `email` / `username` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password: String,
}

impl Credentials {
    /// Build credentials from a login identifier. Anything containing `@`
    /// is sent as an email, everything else as a username.
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let (email, username) = if identifier.contains('@') {
            (Some(identifier), None)
        } else {
            (None, Some(identifier))
        };
        Self {
            email,
            username,
            password: password.into(),
        }
    }
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Raw `{token, user}` payload returned by login and signup.
///
/// Both fields are optional on the wire; a 2xx response without a usable
/// token is still a failed login.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub users_count: u64,
    #[serde(default)]
    pub products_count: u64,
    #[serde(default)]
    pub pending_orders_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, alias = "description")]
    pub message: String,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// `{message}` acknowledgement returned by `DELETE /products/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Ids arrive as strings from document stores and as integers from
/// relational backends.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(id) => id,
            RawId::Number(id) => id.to_string(),
        }
    }
}

/// Document stores send `_id`, sometimes next to an `id` virtual; `id` wins.
fn resolve_id(id: Option<RawId>, document_id: Option<RawId>) -> Result<String, String> {
    id.or(document_id)
        .map(String::from)
        .ok_or_else(|| "missing field `id`".to_string())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProduct {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, rename = "_id")]
    document_id: Option<RawId>,
    name: String,
    #[serde(default)]
    price: Decimal,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, deserialize_with = "de_category")]
    category: Option<String>,
    #[serde(default)]
    stock: Option<u32>,
}

impl TryFrom<RawProduct> for Product {
    type Error = String;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        Ok(Product {
            id: resolve_id(raw.id, raw.document_id)?,
            name: raw.name,
            price: raw.price,
            description: raw.description,
            image_url: raw.image_url.or(raw.image),
            category: raw.category,
            stock: raw.stock,
        })
    }
}

#[derive(Deserialize)]
struct RawCategory {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, rename = "_id")]
    document_id: Option<RawId>,
    name: String,
}

impl TryFrom<RawCategory> for Category {
    type Error = String;

    fn try_from(raw: RawCategory) -> Result<Self, Self::Error> {
        Ok(Category {
            id: resolve_id(raw.id, raw.document_id)?,
            name: raw.name,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, rename = "_id")]
    document_id: Option<RawId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl TryFrom<RawUser> for User {
    type Error = String;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        let name = [raw.name, raw.username, raw.first_name]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .unwrap_or_default();
        Ok(User {
            id: resolve_id(raw.id, raw.document_id)?,
            name,
            email: raw.email,
            role: raw.role.unwrap_or_else(|| "user".to_string()),
        })
    }
}

/// Categories are either a plain name or a populated `{name}` object.
fn de_category<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CategoryRef {
        Name(String),
        Populated { name: String },
    }

    Ok(Option::<CategoryRef>::deserialize(deserializer)?.map(|raw| match raw {
        CategoryRef::Name(name) | CategoryRef::Populated { name } => name,
    }))
}
