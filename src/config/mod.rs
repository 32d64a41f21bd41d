pub mod builtin;
#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::SpeciesTable;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AgeError, Result};
use crate::utils::validation::validate_path;
use toml_config::TomlConfig;

/// 依設定組合參考表：內建表，再疊加 TOML 檔
pub fn load_species_table<C: ConfigProvider + ?Sized>(config: &C) -> Result<SpeciesTable> {
    let Some(path) = config.tables_path() else {
        if config.tables_only() {
            return Err(AgeError::ConfigValidation {
                field: "tables_only".to_string(),
                message: "--tables-only requires --tables".to_string(),
            });
        }
        tracing::debug!("Using built-in reference tables");
        return Ok(builtin::reference_table().clone());
    };

    validate_path("tables", path)?;
    tracing::info!("📁 Loading conversion tables from: {}", path);
    let file = TomlConfig::from_file(path)?;

    let table = if config.tables_only() {
        file.to_species_table()?
    } else {
        file.apply_to(builtin::reference_table().clone())?
    };

    tracing::info!(
        "✅ Loaded {} species ({} categories)",
        table.len(),
        table
            .species()
            .map(|profile| profile.categories.len())
            .sum::<usize>()
    );
    Ok(table)
}
