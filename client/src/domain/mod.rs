//! Domain primitives, services, and the session state machine.
//!
//! Purpose: hold everything with contract or state-machine semantics:
//! identities, the session store and its persistence rules, the typed API
//! client, the role gate, and the catalogue/order services. Infrastructure
//! stays behind the traits in [`ports`].
//!
//! Public surface:
//! - `SessionStore` / `SessionState`: single source of truth for auth state.
//! - `TokenStorage`: bearer-token mirror with expiry introspection.
//! - `ApiClient`: bearer injection, 401 handling, error normalisation.
//! - `AuthService`, `OrderService`, `CatalogService`: endpoint wrappers.
//! - `decide_route`: synchronous role gate.

pub mod activity;
pub mod api_client;
pub mod auth;
pub mod auth_service;
pub mod catalog;
pub mod catalog_service;
pub mod error;
pub mod floor_plan;
pub mod listing;
pub mod order;
pub mod order_service;
pub mod ports;
pub mod quiz;
pub mod resource_id;
pub mod router;
pub mod session;
pub(crate) mod slug;
pub mod token;
pub mod user;
pub mod validation;

pub use self::activity::{ACTIVITY_THROTTLE_SECS, ActivityTracker};
pub use self::api_client::ApiClient;
pub use self::auth::{AuthResponse, LoginCredentials, PASSWORD_MIN_LEN, Registration};
pub use self::auth_service::AuthService;
pub use self::catalog::{
    CatalogFilter, CatalogHit, Category, CategoryBody, CategoryDraft, Item, NewItem, Subcategory,
    Subsection,
};
pub use self::catalog_service::{CatalogEditError, CatalogService};
pub use self::error::{ApiError, ApiErrorKind};
pub use self::floor_plan::{FloorPlan, FloorPlanError, FloorSummary, Table, TableStatus};
pub use self::listing::Listing;
pub use self::order::{
    NewOrder, Order, OrderFilter, OrderForm, OrderStats, OrderStatus, OrderType, OrderUpdate,
};
pub use self::order_service::{OrderService, SubmitOrderError};
pub use self::quiz::{FlavorFamily, Intensity, Occasion, QuizAnswers, QuizRecommendation};
pub use self::resource_id::ResourceId;
pub use self::router::{Access, Route, RouteDecision, UnknownRoute, decide_route};
pub use self::session::{
    PersistedSession, PersistedState, RehydrationOutcome, STALE_AFTER_MS, SessionState,
    SessionStatus, SessionStore,
};
pub use self::token::{TokenClaims, TokenStorage};
pub use self::user::{Role, User, UserId, UserValidationError};
pub use self::validation::FormValidationError;
