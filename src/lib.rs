pub mod config;
pub mod core;
pub mod derive;
pub mod domain;
pub mod export;
pub mod fetch;
pub mod render;
pub mod theme;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use crate::core::{engine::CardEngine, pipeline::CardPipeline};
pub use domain::model::{Capabilities, CardVariant, DealRecord};
pub use theme::CardTheme;
pub use utils::error::{CardError, Result};
