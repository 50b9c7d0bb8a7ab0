use crate::api::Product;
use crate::store::mvi::Intent;

#[derive(Debug, Clone)]
pub enum CartIntent {
    /// Insert with quantity 1, or bump an existing line by one.
    AddItem { product: Product },
    /// Drop the line. Unknown ids are ignored.
    RemoveItem { product_id: String },
    /// Positive values overwrite the quantity; zero or below removes the line.
    SetQuantity { product_id: String, quantity: i64 },
    Clear,
}

impl Intent for CartIntent {}
