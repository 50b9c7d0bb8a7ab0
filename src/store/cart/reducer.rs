//! Reducer for the shopping cart.

use crate::store::mvi::Reducer;

use super::intent::CartIntent;
use super::state::{Cart, CartLine};

/// Pure cart transitions. Every arm builds a fresh line list; nothing here
/// can fail.
pub struct CartReducer;

impl Reducer for CartReducer {
    type State = Cart;
    type Intent = CartIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            CartIntent::AddItem { product } => {
                if state.contains(&product.id) {
                    map_line(state, &product.id, |line| CartLine {
                        quantity: line.quantity.saturating_add(1),
                        ..line
                    })
                } else {
                    let lines = state
                        .lines
                        .into_iter()
                        .chain(std::iter::once(CartLine::from_product(&product)))
                        .collect();
                    Cart { lines }
                }
            }

            CartIntent::RemoveItem { product_id } => remove_line(state, &product_id),

            CartIntent::SetQuantity {
                product_id,
                quantity,
            } => {
                if !state.contains(&product_id) {
                    return state;
                }
                if quantity <= 0 {
                    return remove_line(state, &product_id);
                }
                // Above u32::MAX: clamp rather than reject.
                let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                map_line(state, &product_id, |line| CartLine { quantity, ..line })
            }

            CartIntent::Clear => Cart::default(),
        }
    }
}

fn map_line(state: Cart, product_id: &str, f: impl Fn(CartLine) -> CartLine) -> Cart {
    let lines = state
        .lines
        .into_iter()
        .map(|line| if line.product_id == product_id { f(line) } else { line })
        .collect();
    Cart { lines }
}

fn remove_line(state: Cart, product_id: &str) -> Cart {
    let lines = state
        .lines
        .into_iter()
        .filter(|line| line.product_id != product_id)
        .collect();
    Cart { lines }
}
