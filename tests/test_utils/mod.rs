pub mod fixtures;

pub use fixtures::{log_dir, read_back};
