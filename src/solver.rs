pub mod context;
pub mod grid;
pub mod moments;
pub mod ugks;
pub mod utils;
pub mod velocity;

pub use context::{Config, ConfigError, Context};
