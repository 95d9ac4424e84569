//! Quiz server module.
//!
//! Serves quiz attempts over WebSocket without keeping attempt state.

mod server;
mod state;

pub use server::run;
pub use state::{ServerConfig, ServerState};
