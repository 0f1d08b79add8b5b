// API module
//
// This module exposes a ledger over HTTP: mining, transaction submission,
// chain inspection and peer node registration

pub mod error;
pub mod handlers;
pub mod nodes;
pub mod routes;
pub mod schema;
pub mod state;

// Re-export main components for easier access
pub use error::ApiError;
pub use routes::configure_routes;
pub use state::{generate_node_id, AppState};
