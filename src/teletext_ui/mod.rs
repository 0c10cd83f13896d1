// src/teletext_ui/mod.rs - Teletext-style ranking pages

pub mod core;
pub mod footer;
pub mod page_builder;
pub mod pagination;
mod rendering;
pub mod utils;

pub use core::*;
pub use page_builder::{build_error_page, build_loading_page, build_ranking_page, season_subheader};

pub use utils::get_ansi_code;
