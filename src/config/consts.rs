/// Filter used when neither `RUST_LOG` nor the configuration supplies a valid one
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Upper bound for `degree_of_parallelism` (concurrent batch subjects)
pub const MAX_DEGREE_OF_PARALLELISM: usize = 1024;
