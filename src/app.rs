//! Application state container.
//!
//! [`Storefront`] owns the cart and session, the persistence layer and the
//! API gateway. It is created once per process and passed to whatever
//! front-end drives it:
//!
//! ```text
//! boot (rehydrate) ──→ dispatch / network calls ──→ logout (optional teardown)
//! ```
//!
//! Reducers run under a short-lived lock that is never held across an
//! `.await`, so cart edits keep working while a login is in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::{
    self, Activity, ApiError, ApiGateway, ApiRequest, AuthResponse, Category, Credentials,
    DashboardStats, MessageResponse, Product, ProductForm, User,
};
use crate::forms::{place_order, CheckoutForm, OrderSummary, SignupForm, ValidationError};
use crate::guard::{guard, Access, Route};
use crate::persist::{Persistor, Rehydrated, Storage, StorageError};
use crate::store::auth::{AuthIntent, AuthReducer, AuthState, BearerToken, Session};
use crate::store::cart::{Cart, CartIntent, CartReducer};
use crate::store::mvi::Reducer;

/// Errors surfaced to the front-end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Access denied to {route:?} page ({access:?})")]
    AccessDenied { route: Route, access: Access },

    /// A newer login attempt was submitted before this one resolved.
    #[error("Superseded by a newer sign-in attempt")]
    Superseded,
}

/// Everything the front-end renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub cart: Cart,
    pub auth: AuthState,
}

pub struct Storefront {
    gateway: ApiGateway,
    persistor: Persistor,
    state: Mutex<AppState>,
    next_request: AtomicU64,
}

impl Storefront {
    /// Rehydrate persisted state and build the container. Never fails on
    /// bad persisted data; see [`Persistor::rehydrate`].
    pub fn boot(gateway: ApiGateway, storage: Arc<dyn Storage>) -> Self {
        let persistor = Persistor::new(storage);
        let Rehydrated {
            cart,
            session,
            source,
        } = persistor.rehydrate();
        tracing::info!(
            source = ?source,
            cart_lines = cart.len(),
            authenticated = session.is_authenticated(),
            "Storefront state ready"
        );

        Self {
            gateway,
            persistor,
            state: Mutex::new(AppState {
                cart,
                auth: AuthState::with_session(session),
            }),
            next_request: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.state.lock().clone()
    }

    pub fn cart(&self) -> Cart {
        self.state.lock().cart.clone()
    }

    pub fn auth(&self) -> AuthState {
        self.state.lock().auth.clone()
    }

    pub fn session(&self) -> Session {
        self.state.lock().auth.session.clone()
    }

    pub fn access(&self, route: Route) -> Access {
        guard(route, &self.state.lock().auth.session)
    }

    // -- Dispatch ----------------------------------------------------------

    pub fn dispatch_cart(&self, intent: CartIntent) -> Result<Cart, StorageError> {
        let mut state = self.state.lock();
        self.reduce_cart(&mut state, intent)?;
        Ok(state.cart.clone())
    }

    pub fn dispatch_auth(&self, intent: AuthIntent) -> Result<AuthState, StorageError> {
        let mut state = self.state.lock();
        self.reduce_auth(&mut state, intent)?;
        Ok(state.auth.clone())
    }

    // Both reducers persist while the state lock is held, so storage sees
    // transitions in commit order.

    fn reduce_cart(&self, state: &mut AppState, intent: CartIntent) -> Result<(), StorageError> {
        let next = CartReducer::reduce(state.cart.clone(), intent);
        if next == state.cart {
            return Ok(());
        }
        state.cart = next;
        self.persistor.write_cart(&state.cart)
    }

    fn reduce_auth(&self, state: &mut AppState, intent: AuthIntent) -> Result<(), StorageError> {
        let next = AuthReducer::reduce(state.auth.clone(), intent);
        let session_changed = next.session != state.auth.session;
        state.auth = next;
        if session_changed {
            self.persistor.write_session(&state.auth.session)?;
        }
        Ok(())
    }

    // -- Cart --------------------------------------------------------------

    pub fn add_to_cart(&self, product: Product) -> Result<Cart, StorageError> {
        self.dispatch_cart(CartIntent::AddItem { product })
    }

    /// Fetch the product first so the line gets a fresh snapshot.
    pub async fn add_product_by_id(&self, product_id: &str) -> Result<Cart, AppError> {
        let product = self.product(product_id).await?;
        Ok(self.add_to_cart(product)?)
    }

    pub fn remove_from_cart(&self, product_id: &str) -> Result<Cart, StorageError> {
        self.dispatch_cart(CartIntent::RemoveItem {
            product_id: product_id.to_string(),
        })
    }

    pub fn set_quantity(&self, product_id: &str, quantity: i64) -> Result<Cart, StorageError> {
        self.dispatch_cart(CartIntent::SetQuantity {
            product_id: product_id.to_string(),
            quantity,
        })
    }

    /// One less of `product_id`; the line disappears when it reaches zero.
    pub fn decrement(&self, product_id: &str) -> Result<Cart, StorageError> {
        let mut state = self.state.lock();
        if let Some(quantity) = state.cart.line(product_id).map(|line| line.quantity) {
            let intent = CartIntent::SetQuantity {
                product_id: product_id.to_string(),
                quantity: i64::from(quantity) - 1,
            };
            self.reduce_cart(&mut state, intent)?;
        }
        Ok(state.cart.clone())
    }

    pub fn clear_cart(&self) -> Result<Cart, StorageError> {
        self.dispatch_cart(CartIntent::Clear)
    }

    /// Place the order for the current cart and empty it.
    pub fn checkout(&self, form: &CheckoutForm) -> Result<OrderSummary, AppError> {
        self.require(Route::Protected)?;
        let mut state = self.state.lock();
        let order = place_order(&state.cart, form)?;
        self.reduce_cart(&mut state, CartIntent::Clear)?;
        tracing::info!(
            items = order.item_count,
            total = %order.total,
            payment = order.payment,
            "Order placed"
        );
        Ok(order)
    }

    // -- Session -----------------------------------------------------------

    pub async fn login(&self, credentials: &Credentials) -> Result<User, AppError> {
        let request = self.begin_attempt()?;
        let outcome = self
            .gateway
            .execute::<AuthResponse>(api::auth::login(credentials), None)
            .await
            .and_then(AuthResponse::into_session_parts);
        self.finish_attempt(request, outcome)
    }

    /// Create the account, then sign in with the same credentials.
    pub async fn register(&self, form: &SignupForm) -> Result<User, AppError> {
        form.validate()?;
        let request = self.begin_attempt()?;

        let signup = self
            .gateway
            .execute::<serde_json::Value>(api::auth::signup(&form.to_request()), None)
            .await;
        if let Err(e) = signup {
            return self.finish_attempt(request, Err(e));
        }

        let outcome = self
            .gateway
            .execute::<AuthResponse>(api::auth::login(&form.to_credentials()), None)
            .await
            .and_then(AuthResponse::into_session_parts);
        self.finish_attempt(request, outcome)
    }

    /// Drop the session from memory, the blob and the legacy keys.
    pub fn logout(&self) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        let was_authenticated = state.auth.is_authenticated();
        self.reduce_auth(&mut state, AuthIntent::Logout)?;
        tracing::info!(was_authenticated, "Signed out");
        Ok(())
    }

    /// Sign out and forget everything persisted, cart included.
    pub fn reset(&self) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        self.persistor.purge()?;
        *state = AppState::default();
        tracing::info!("Cleared session and cart");
        Ok(())
    }

    fn begin_attempt(&self) -> Result<u64, StorageError> {
        let request = self.next_request.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatch_auth(AuthIntent::Submit { request })?;
        Ok(request)
    }

    fn finish_attempt(
        &self,
        request: u64,
        outcome: Result<(BearerToken, User), ApiError>,
    ) -> Result<User, AppError> {
        match outcome {
            Ok((token, user)) => {
                let intent = AuthIntent::Succeeded {
                    request,
                    token,
                    user: user.clone(),
                };
                if !self.resolve_attempt(request, intent)? {
                    return Err(AppError::Superseded);
                }
                tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
                Ok(user)
            }
            Err(e) => {
                let intent = AuthIntent::Failed {
                    request,
                    reason: e.to_string(),
                };
                if self.resolve_attempt(request, intent)? {
                    tracing::warn!(error_type = e.error_type(), error = %e, "Sign-in failed");
                }
                Err(e.into())
            }
        }
    }

    /// Apply a login outcome if `request` is still the pending attempt.
    fn resolve_attempt(&self, request: u64, intent: AuthIntent) -> Result<bool, StorageError> {
        let mut state = self.state.lock();
        if state.auth.pending_request() != Some(request) {
            tracing::debug!(request, pending = ?state.auth.pending_request(), "Discarding stale sign-in response");
            return Ok(false);
        }
        self.reduce_auth(&mut state, intent)?;
        Ok(true)
    }

    // -- Gateway -----------------------------------------------------------

    /// Send `request` with the current bearer token.
    ///
    /// A 401/403 on an authenticated call drops the session (memory and
    /// storage) before the error is returned.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, AppError> {
        let token = if request.is_anonymous() {
            None
        } else {
            self.session().token().cloned()
        };

        match self.gateway.execute(request, token.as_ref()).await {
            Ok(body) => Ok(body),
            Err(e) => {
                if e.is_authorization_failure() {
                    if let Some(token) = token.as_ref() {
                        self.invalidate(&e, token);
                    }
                }
                Err(e.into())
            }
        }
    }

    fn invalidate(&self, err: &ApiError, token: &BearerToken) {
        let status = err.status().unwrap_or(401);
        let mut state = self.state.lock();
        // Signed in again while the rejected call was in flight.
        if state.auth.session.token() != Some(token) {
            tracing::debug!(status, "Ignoring authorization failure for a replaced session");
            return;
        }
        tracing::warn!(status, "Server rejected credentials, signing out");
        if let Err(e) = self.reduce_auth(&mut state, AuthIntent::Invalidate { status }) {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
    }

    fn require(&self, route: Route) -> Result<(), AppError> {
        let access = self.access(route);
        if access.is_allowed() {
            return Ok(());
        }
        Err(AppError::AccessDenied { route, access })
    }

    // -- Catalog -----------------------------------------------------------

    pub async fn products(&self) -> Result<Vec<Product>, AppError> {
        self.send(api::products::list()).await
    }

    pub async fn product(&self, product_id: &str) -> Result<Product, AppError> {
        self.send(api::products::get(product_id)).await
    }

    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, AppError> {
        self.send(api::products::search(query.trim())).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, AppError> {
        self.send(api::categories::list()).await
    }

    // -- Admin -------------------------------------------------------------

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        self.require(Route::AdminOnly)?;
        self.send(api::admin::dashboard_stats()).await
    }

    pub async fn recent_activities(&self) -> Result<Vec<Activity>, AppError> {
        self.require(Route::AdminOnly)?;
        self.send(api::admin::recent_activities()).await
    }

    pub async fn create_product(&self, form: ProductForm) -> Result<Product, AppError> {
        self.require(Route::AdminOnly)?;
        self.send(api::products::create(form)).await
    }

    pub async fn update_product(
        &self,
        product_id: &str,
        form: ProductForm,
    ) -> Result<Product, AppError> {
        self.require(Route::AdminOnly)?;
        self.send(api::products::update(product_id, form)).await
    }

    pub async fn delete_product(&self, product_id: &str) -> Result<MessageResponse, AppError> {
        self.require(Route::AdminOnly)?;
        self.send(api::products::delete(product_id)).await
    }
}
