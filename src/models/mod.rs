pub mod job;
pub mod url_list;

pub use job::{ConversionJob, ConversionResult, JobState, Outcome};
pub use url_list::parse_url_list;
