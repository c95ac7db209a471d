pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{CardSpec, CardVariant, ComposeResult, DealRecord};
pub use crate::domain::ports::{ConfigProvider, ImageSource, Pipeline, Storage};
pub use crate::utils::error::Result;
