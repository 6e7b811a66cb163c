//! Role-gated routing.
//!
//! [`decide_route`] is a pure function of the session snapshot and the
//! target route. Callers re-run it on every session change (see
//! [`crate::domain::SessionStore::subscribe`]); nothing is cached.
//!
//! The gate is a convenience for the UI. The backend enforces roles on its
//! own.

use std::fmt;
use std::str::FromStr;

use super::session::SessionState;
use super::Role;

/// Screens the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Landing page.
    Home,
    /// Catalogue browser.
    Menu,
    /// Shisha flavour configurator.
    Quiz,
    /// Public order form.
    OrderForm,
    /// Login form.
    Login,
    /// Registration form.
    Register,
    /// Default landing for authenticated users.
    Dashboard,
    /// Order administration.
    AdminOrders,
    /// Catalogue administration.
    AdminCatalog,
    /// Table floor plan.
    FloorPlan,
}

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone.
    Public,
    /// Only visitors who are not logged in; logged-in users are bounced to
    /// the dashboard.
    AuthEntry,
    /// Any authenticated user.
    Authenticated,
    /// Authenticated users holding the given role.
    Role(Role),
}

/// Path did not match a known route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no route for path '{0}'")]
pub struct UnknownRoute(pub String);

const ROUTES: [(Route, &str); 10] = [
    (Route::Home, "/"),
    (Route::Menu, "/menu"),
    (Route::Quiz, "/quiz"),
    (Route::OrderForm, "/order"),
    (Route::Login, "/login"),
    (Route::Register, "/register"),
    (Route::Dashboard, "/dashboard"),
    (Route::AdminOrders, "/admin/orders"),
    (Route::AdminCatalog, "/admin/catalog"),
    (Route::FloorPlan, "/admin/tables"),
];

impl Route {
    /// Every route, in navigation order.
    pub fn all() -> impl Iterator<Item = Route> {
        ROUTES.iter().map(|(route, _)| *route)
    }

    /// Canonical path.
    pub fn path(self) -> &'static str {
        ROUTES
            .iter()
            .find_map(|(route, path)| (*route == self).then_some(*path))
            .unwrap_or("/")
    }

    /// Parse a path, ignoring a trailing slash and any query string.
    pub fn from_path(path: &str) -> Result<Self, UnknownRoute> {
        let without_query = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = without_query.trim_end_matches('/');
        let normalised = if trimmed.is_empty() { "/" } else { trimmed };
        ROUTES
            .iter()
            .find_map(|(route, candidate)| (*candidate == normalised).then_some(*route))
            .ok_or_else(|| UnknownRoute(path.to_owned()))
    }

    /// Access rule for this route.
    pub fn access(self) -> Access {
        match self {
            Self::Home | Self::Menu | Self::Quiz | Self::OrderForm => Access::Public,
            Self::Login | Self::Register => Access::AuthEntry,
            Self::Dashboard => Access::Authenticated,
            Self::AdminOrders | Self::AdminCatalog | Self::FloorPlan => Access::Role(Role::Admin),
        }
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Self::from_path(path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What to show for a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session has not finished rehydrating; show a neutral placeholder.
    Pending,
    /// Show the requested route.
    Render(Route),
    /// Show the login view.
    RedirectToLogin,
    /// Replace the requested route with another one.
    RedirectTo(Route),
    /// The user lacks the required role; show a denial and offer `fallback`.
    AccessDenied {
        /// Where the denial view links back to.
        fallback: Route,
    },
}

impl RouteDecision {
    /// The route whose content ends up on screen, if any.
    pub fn rendered(self) -> Option<Route> {
        match self {
            Self::Render(route) | Self::RedirectTo(route) => Some(route),
            Self::RedirectToLogin => Some(Route::Login),
            Self::Pending | Self::AccessDenied { .. } => None,
        }
    }
}

/// Decide what to show for `target` given the current session.
pub fn decide_route(state: &SessionState, target: Route) -> RouteDecision {
    if !state.is_hydrated() && target.access() != Access::Public {
        return RouteDecision::Pending;
    }
    let user = state.user().filter(|_| state.is_authenticated());
    match (target.access(), user) {
        (Access::Public, _) => RouteDecision::Render(target),
        (Access::AuthEntry, Some(_)) => RouteDecision::RedirectTo(Route::Dashboard),
        (Access::AuthEntry, None) => RouteDecision::Render(target),
        (Access::Authenticated | Access::Role(_), None) => RouteDecision::RedirectToLogin,
        (Access::Authenticated, Some(_)) => RouteDecision::Render(target),
        (Access::Role(required), Some(user)) if user.role == required => RouteDecision::Render(target),
        (Access::Role(_), Some(_)) => RouteDecision::AccessDenied {
            fallback: Route::Dashboard,
        },
    }
}
