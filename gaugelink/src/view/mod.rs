//! View components for the GaugeLink UI.

pub mod gauge;
pub mod page;
pub mod theme;

pub use page::{Connection, Notice, Page, page_view};
