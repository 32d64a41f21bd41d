pub mod batch;
pub mod birth_date;
pub mod calculator;
pub mod converter;

pub use crate::domain::model::{ConversionData, Estimate, Selection};
pub use crate::domain::ports::{ConfigProvider, TableProvider};
pub use crate::utils::error::Result;
