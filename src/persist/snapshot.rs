//! Layout of the persisted blob and the recovery rules for reading it.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::api::User;
use crate::store::auth::{BearerToken, Session};
use crate::store::cart::Cart;

/// Storage key of the namespaced blob.
pub const ROOT_KEY: &str = "persist:root";
/// Flat legacy keys kept for code paths that predate the blob.
pub const LEGACY_TOKEN_KEY: &str = "token";
pub const LEGACY_USER_KEY: &str = "user";

/// Bump on any incompatible change to the slice formats. Blobs stamped
/// with another version are discarded on boot.
pub const SCHEMA_VERSION: u64 = 1;

const VERSION_FIELD: &str = "version";

/// Whitelisted domains stored in the blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Auth,
    Cart,
}

impl Slice {
    pub fn key(&self) -> &'static str {
        match self {
            Slice::Auth => "auth",
            Slice::Cart => "cart",
        }
    }
}

/// How the boot state was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RehydrateSource {
    /// Nothing stored yet.
    Fresh,
    /// Loaded from the current-version blob.
    Blob,
    /// No blob, session rebuilt from the flat `token`/`user` keys.
    Legacy,
    /// Something was stored but unusable; defaults were used.
    Discarded { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rehydrated {
    pub cart: Cart,
    pub session: Session,
    pub source: RehydrateSource,
}

impl Rehydrated {
    pub fn fresh() -> Self {
        Self {
            cart: Cart::default(),
            session: Session::default(),
            source: RehydrateSource::Fresh,
        }
    }

    fn discarded(reason: String) -> Self {
        tracing::warn!(%reason, "Discarding persisted state, starting with defaults");
        Self {
            source: RehydrateSource::Discarded { reason },
            ..Self::fresh()
        }
    }
}

/// Parse the blob if it is an object stamped with the current version.
pub fn current_root(raw: &str) -> Result<Map<String, Value>, String> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| format!("unparseable blob: {}", e))?;
    let Value::Object(root) = value else {
        return Err("blob is not a JSON object".to_string());
    };
    match root.get(VERSION_FIELD).and_then(Value::as_u64) {
        Some(SCHEMA_VERSION) => Ok(root),
        Some(other) => Err(format!(
            "schema version {} does not match {}",
            other, SCHEMA_VERSION
        )),
        None => Err("blob carries no schema version".to_string()),
    }
}

pub fn empty_root() -> Map<String, Value> {
    let mut root = Map::new();
    root.insert(VERSION_FIELD.to_string(), Value::from(SCHEMA_VERSION));
    root
}

/// Decode a blob. Never fails: a bad blob yields defaults, and each slice
/// is decoded on its own so one corrupt domain does not take the other
/// down with it.
pub fn decode(raw: &str) -> Rehydrated {
    let root = match current_root(raw) {
        Ok(root) => root,
        Err(reason) => return Rehydrated::discarded(reason),
    };
    Rehydrated {
        cart: decode_slice(&root, Slice::Cart),
        session: decode_slice(&root, Slice::Auth),
        source: RehydrateSource::Blob,
    }
}

fn decode_slice<T: DeserializeOwned + Default>(root: &Map<String, Value>, slice: Slice) -> T {
    let Some(value) = root.get(slice.key()) else {
        return T::default();
    };
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(slice = slice.key(), error = %e, "Persisted slice is corrupt, using default");
            T::default()
        }
    }
}

/// Rebuild a session from the flat legacy keys. Both must be present and
/// valid; half a session is no session.
pub fn decode_legacy(token: Option<String>, user: Option<String>) -> Option<Session> {
    let token = BearerToken::parse(token?)?;
    let user: User = serde_json::from_str(&user?).ok()?;
    Some(Session::Authenticated { token, user })
}
