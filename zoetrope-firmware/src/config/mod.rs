//! Frame configuration loading

mod loader;
mod toml;

pub use loader::load;
pub use toml::{parse_config, ParseError};
