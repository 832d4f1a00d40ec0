pub mod archive;
pub mod artifact;
pub mod failure_writer;

pub use archive::{ArchiveAssembler, ArchiveEntry, ArchiveWriter};
pub use artifact::Artifact;
pub use failure_writer::FailureWriter;
