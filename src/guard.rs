//! Access rules for the storefront's pages.

use crate::store::auth::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Catalog, product details, about/contact.
    Public,
    /// Checkout and anything else that needs an account.
    Protected,
    /// Admin dashboard and product CRUD.
    AdminOnly,
    /// Login and signup; pointless once signed in.
    PublicOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectToLogin,
    RedirectHome,
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow)
    }
}

pub fn guard(route: Route, session: &Session) -> Access {
    match route {
        Route::Public => Access::Allow,
        Route::Protected if session.is_authenticated() => Access::Allow,
        Route::Protected => Access::RedirectToLogin,
        Route::AdminOnly if !session.is_authenticated() => Access::RedirectToLogin,
        Route::AdminOnly if session.is_admin() => Access::Allow,
        Route::AdminOnly => Access::RedirectHome,
        Route::PublicOnly if session.is_authenticated() => Access::RedirectHome,
        Route::PublicOnly => Access::Allow,
    }
}
