pub mod config;
pub mod generate;
pub mod normalize;
pub mod parse;
pub mod render;

pub use config::GenerateConfig;
pub use generate::{generate, Report};
pub use normalize::{normalize, Diagnostic, Summary};
pub use parse::{load_table, Table};
