pub mod interactive;
pub mod teletext;

pub use interactive::run_interactive_ui;
