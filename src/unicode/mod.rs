//! Unicode utilities for display width and word-wrap opportunities.

mod width;
mod words;

pub use width::{WidthMethod, char_columns, str_columns};
pub use words::{break_opportunities, last_break_opportunity};
