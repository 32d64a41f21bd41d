use crate::domain::model::{
    normalize_key, Category, ConversionData, LifespanRange, PointTable, RateRange, SpeciesProfile,
    SpeciesTable,
};
use crate::utils::error::{AgeError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Conversion tables read from a TOML file.
///
/// ```toml
/// [species.dog.categories.small]
/// points = [[1, 15], [2, 24]]
///
/// [species.bird.categories.cockatiel]
/// rate = { min = 5, max = 6 }
/// lifespan = { min = 15, max = 25 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub label: Option<String>,
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub label: Option<String>,
    pub points: Option<Vec<(f64, f64)>>,
    pub rate: Option<RangeConfig>,
    pub lifespan: Option<RangeConfig>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AgeError::ConfigValidation {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PET_AGE_CAT_LABEL})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| AgeError::ConfigValidation {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Build a table from this file alone.
    pub fn to_species_table(&self) -> Result<SpeciesTable> {
        self.apply_to(SpeciesTable::new())
    }

    /// Overlay this file on `base`: categories with the same key are replaced,
    /// new species and categories are added.
    pub fn apply_to(&self, mut base: SpeciesTable) -> Result<SpeciesTable> {
        for (raw_key, species) in &self.species {
            let key = normalize_key(raw_key);
            validate_non_empty_string("species", &key)?;

            let mut categories = Vec::with_capacity(species.categories.len());
            for (raw_category, config) in &species.categories {
                categories.push(config.to_category(&key, raw_category)?);
            }

            match base.get_mut(&key) {
                Some(profile) => {
                    if let Some(label) = &species.label {
                        profile.label = label.clone();
                    }
                    for category in categories {
                        profile.insert(category);
                    }
                }
                None => {
                    if categories.is_empty() {
                        return Err(AgeError::ConfigValidation {
                            field: format!("species.{}", key),
                            message: "a new species needs at least one category".to_string(),
                        });
                    }
                    let label = species.label.clone().unwrap_or_else(|| key.clone());
                    let mut profile = SpeciesProfile::new(&key, &label);
                    for category in categories {
                        profile.insert(category);
                    }
                    base.insert(profile);
                }
            }
        }

        Ok(base)
    }

    pub fn validate_config(&self) -> Result<()> {
        self.to_species_table().map(|_| ())
    }
}

impl CategoryConfig {
    fn to_category(&self, species: &str, raw_key: &str) -> Result<Category> {
        let key = normalize_key(raw_key);
        let name = format!("{}.{}", species, key);
        validate_non_empty_string(&format!("species.{}.categories", species), &key)?;

        let data = match (&self.points, &self.rate) {
            (Some(points), None) => ConversionData::Points(
                PointTable::from_pairs(points).map_err(|e| e.for_table(&name))?,
            ),
            (None, Some(rate)) => ConversionData::Rate(
                RateRange::new(rate.min, rate.max).map_err(|e| e.for_table(&name))?,
            ),
            (Some(_), Some(_)) => {
                return Err(AgeError::InvalidTable {
                    table: name,
                    reason: "set either `points` or `rate`, not both".to_string(),
                })
            }
            (None, None) => {
                return Err(AgeError::InvalidTable {
                    table: name,
                    reason: "missing `points` or `rate`".to_string(),
                })
            }
        };

        let label = self.label.clone().unwrap_or_else(|| key.clone());
        let mut category = Category::new(&key, &label, data);
        if let Some(lifespan) = self.lifespan {
            category = category.with_lifespan(
                LifespanRange::new(lifespan.min, lifespan.max).map_err(|e| e.for_table(&name))?,
            );
        }
        Ok(category)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
