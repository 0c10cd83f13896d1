//! Interactive UI module
//!
//! - `state_manager`: streams, sort state and the page on screen
//! - `input_handler`: keyboard input
//! - `core`: terminal setup and the main loop

mod core;
mod input_handler;
mod state_manager;

pub use core::run_interactive_ui;
pub use state_manager::InteractiveState;
