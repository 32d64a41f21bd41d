pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::builtin::reference_table;
pub use self::core::{calculator::Calculator, converter::AgeConverter};
pub use domain::model::{
    BoundaryPolicy, Conversion, ConversionData, ConversionMethod, Estimate, PointTable, RateRange,
    Selection, SpeciesTable,
};
pub use utils::error::{AgeError, Result};
