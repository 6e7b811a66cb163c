//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (local storage, the HTTP wire, the registered session). Each trait
//! exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning `anyhow::Result`.

mod http_transport;
mod key_value_store;
mod macros;
mod session_handle;

pub(crate) use macros::define_port_error;

pub use http_transport::{
    ApiRequest, ApiResponse, HttpMethod, HttpTransport, TransportError,
};
pub use key_value_store::{KeyValueStore, StorageError};
pub use session_handle::SessionHandle;
