pub mod logging;
pub mod naming;

pub use logging::truncate_text;
pub use naming::{sanitize, unique_name};
