//! Quiz client module.
//!
//! Terminal client that plays quizzes against a quiz server.

mod client;
mod state;
mod terminal;
mod ui;

pub use client::run;
