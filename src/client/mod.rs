//! Search client: transport, request controller and view contract.

pub mod api;
pub mod controller;
pub mod view;

pub use api::{ClientError, HttpSearchApi, LocalSearchApi, SearchApi};
pub use controller::{ControllerError, RequestController};
pub use view::{idle_label, ControlState, SearchView, BUSY_LABEL, GENERIC_CLIENT_ERROR};
