pub mod display;
pub mod structured;

pub use display::{DisplayConfig, DisplayFormatter, html_escape, to_display_markup};
pub use structured::render_structured;
