pub mod scenario;
mod util;

pub use util::{FailureArtifact, artifacts_dir, split_csv, write_failure_artifact};
