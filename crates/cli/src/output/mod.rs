//! Result envelope and rendering.

mod format;
mod model;
mod render;

pub use format::OutputFormat;
pub use model::*;
pub use render::{print_error, print_result};
