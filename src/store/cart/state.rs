use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::Product;
use crate::store::mvi::DomainState;

/// One product-quantity pairing.
///
/// Name, price, image and category are a snapshot taken when the product
/// was first added; later catalog edits do not reach existing lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Always >= 1.
    pub quantity: u32,
}

impl CartLine {
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            quantity: 1,
        }
    }

    /// Price × quantity, pinned to the `Decimal` range instead of
    /// overflowing.
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Ordered cart lines, at most one per product id.
///
/// Totals are derived on every read and never stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawCart")]
pub struct Cart {
    pub(super) lines: Vec<CartLine>,
}

impl DomainState for Cart {}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.line(product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Σ price × quantity, saturating like [`CartLine::subtotal`].
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |total, line| total.saturating_add(line.subtotal()))
    }
}

/// Wire form of a persisted cart. Anything read back from storage passes
/// through here, so hand-edited or stale payloads cannot break the
/// one-line-per-product and positive-quantity rules.
#[derive(Deserialize)]
struct RawCart {
    #[serde(default)]
    lines: Vec<CartLine>,
}

impl From<RawCart> for Cart {
    fn from(raw: RawCart) -> Self {
        let mut lines: Vec<CartLine> = Vec::with_capacity(raw.lines.len());
        for line in raw.lines.into_iter().filter(|line| line.quantity > 0) {
            match lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
                None => lines.push(line),
            }
        }
        Cart { lines }
    }
}
