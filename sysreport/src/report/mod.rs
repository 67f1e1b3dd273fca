//! Report document: a backend-independent layout and its PDF rendering.

pub mod layout;
pub mod pdf;

pub use layout::{build_layout, ReportLayout};
pub use pdf::write_pdf;
