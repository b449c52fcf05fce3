pub mod config;
pub mod generate;
pub mod inspect;

pub use config::*;
pub use generate::*;
pub use inspect::*;
