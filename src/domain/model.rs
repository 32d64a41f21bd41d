use crate::utils::error::{AgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 物種、分類的識別字統一成小寫並以 `-` 連接
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgePoint {
    pub subject_age: f64,
    pub equivalent_age: f64,
}

impl AgePoint {
    pub fn new(subject_age: f64, equivalent_age: f64) -> Self {
        Self {
            subject_age,
            equivalent_age,
        }
    }
}

/// Reference points sorted strictly ascending by subject age.
///
/// Construction rejects empty, unsorted, duplicated or negative input, so a
/// `PointTable` always has at least one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PointTable {
    points: Vec<AgePoint>,
}

impl PointTable {
    pub fn new(points: Vec<AgePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(invalid_table("table has no points"));
        }

        for point in &points {
            if !point.subject_age.is_finite() || !point.equivalent_age.is_finite() {
                return Err(invalid_table(format!(
                    "point ({}, {}) is not finite",
                    point.subject_age, point.equivalent_age
                )));
            }
            if point.subject_age < 0.0 || point.equivalent_age < 0.0 {
                return Err(invalid_table(format!(
                    "point ({}, {}) has a negative age",
                    point.subject_age, point.equivalent_age
                )));
            }
        }

        for pair in points.windows(2) {
            if pair[1].subject_age == pair[0].subject_age {
                return Err(invalid_table(format!(
                    "duplicate subject age {}",
                    pair[0].subject_age
                )));
            }
            if pair[1].subject_age < pair[0].subject_age {
                return Err(invalid_table(format!(
                    "subject age {} comes after {}; points must be sorted ascending",
                    pair[1].subject_age, pair[0].subject_age
                )));
            }
        }

        Ok(Self { points })
    }

    /// Compiled-in data, checked by the reference table tests.
    pub(crate) fn from_trusted_pairs(pairs: &[(f64, f64)]) -> Self {
        let points: Vec<AgePoint> = pairs
            .iter()
            .map(|&(subject, equivalent)| AgePoint::new(subject, equivalent))
            .collect();
        debug_assert!(!points.is_empty());
        debug_assert!(points.windows(2).all(|p| p[0].subject_age < p[1].subject_age));
        Self { points }
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(subject, equivalent)| AgePoint::new(subject, equivalent))
                .collect(),
        )
    }

    pub fn points(&self) -> &[AgePoint] {
        &self.points
    }

    pub fn first(&self) -> AgePoint {
        self.points[0]
    }

    pub fn last(&self) -> AgePoint {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Each subject year equals between `min_rate` and `max_rate` equivalent years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateRange {
    min_rate: f64,
    max_rate: f64,
}

impl RateRange {
    pub fn new(min_rate: f64, max_rate: f64) -> Result<Self> {
        if !min_rate.is_finite() || !max_rate.is_finite() {
            return Err(invalid_table("rates must be finite"));
        }
        if min_rate <= 0.0 || max_rate <= 0.0 {
            return Err(invalid_table(format!(
                "rates must be positive (got {} - {})",
                min_rate, max_rate
            )));
        }
        if min_rate > max_rate {
            return Err(invalid_table(format!(
                "min rate {} is greater than max rate {}",
                min_rate, max_rate
            )));
        }
        Ok(Self { min_rate, max_rate })
    }

    pub(crate) const fn from_trusted(min_rate: f64, max_rate: f64) -> Self {
        Self { min_rate, max_rate }
    }

    pub fn min_rate(&self) -> f64 {
        self.min_rate
    }

    pub fn max_rate(&self) -> f64 {
        self.max_rate
    }

    pub fn average_rate(&self) -> f64 {
        (self.min_rate + self.max_rate) / 2.0
    }
}

/// 僅供顯示的壽命範圍（年）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LifespanRange {
    pub min_years: f64,
    pub max_years: f64,
}

impl LifespanRange {
    pub fn new(min_years: f64, max_years: f64) -> Result<Self> {
        if !min_years.is_finite() || !max_years.is_finite() || min_years < 0.0 {
            return Err(invalid_table(format!(
                "lifespan {} - {} must be finite and non-negative",
                min_years, max_years
            )));
        }
        if min_years > max_years {
            return Err(invalid_table(format!(
                "lifespan minimum {} is greater than maximum {}",
                min_years, max_years
            )));
        }
        Ok(Self {
            min_years,
            max_years,
        })
    }
}

impl fmt::Display for LifespanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} years", self.min_years, self.max_years)
    }
}

/// The two shapes of conversion data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionData {
    Points(PointTable),
    Rate(RateRange),
}

impl ConversionData {
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionData::Points(_) => "point table",
            ConversionData::Rate(_) => "rate range",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub key: String,
    pub label: String,
    pub data: ConversionData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<LifespanRange>,
}

impl Category {
    pub fn new(key: &str, label: &str, data: ConversionData) -> Self {
        Self {
            key: normalize_key(key),
            label: label.to_string(),
            data,
            lifespan: None,
        }
    }

    pub fn with_lifespan(mut self, lifespan: LifespanRange) -> Self {
        self.lifespan = Some(lifespan);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesProfile {
    pub key: String,
    pub label: String,
    pub categories: BTreeMap<String, Category>,
}

impl SpeciesProfile {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: normalize_key(key),
            label: label.to_string(),
            categories: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.insert(category);
        self
    }

    pub fn insert(&mut self, category: Category) {
        self.categories.insert(category.key.clone(), category);
    }

    pub fn category_keys(&self) -> String {
        self.categories
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Species identifier to its conversion data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SpeciesTable {
    species: BTreeMap<String, SpeciesProfile>,
}

/// A species/category pair resolved from a [`SpeciesTable`].
#[derive(Debug, Clone, Copy)]
pub struct ResolvedCategory<'a> {
    pub species: &'a SpeciesProfile,
    pub category: &'a Category,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: SpeciesProfile) {
        self.species.insert(profile.key.clone(), profile);
    }

    pub fn with_species(mut self, profile: SpeciesProfile) -> Self {
        self.insert(profile);
        self
    }

    pub fn get(&self, species: &str) -> Option<&SpeciesProfile> {
        self.species.get(&normalize_key(species))
    }

    pub fn species(&self) -> impl Iterator<Item = &SpeciesProfile> {
        self.species.values()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get_mut(&mut self, species: &str) -> Option<&mut SpeciesProfile> {
        self.species.get_mut(&normalize_key(species))
    }

    pub fn resolve(&self, species: &str, category: Option<&str>) -> Result<ResolvedCategory<'_>> {
        let profile = self.get(species).ok_or_else(|| AgeError::UnknownSpecies {
            species: species.to_string(),
        })?;

        let category = match category.map(normalize_key).filter(|key| !key.is_empty()) {
            Some(key) => profile
                .categories
                .get(&key)
                .ok_or_else(|| AgeError::UnknownCategory {
                    species: profile.key.clone(),
                    category: key.clone(),
                    expected: profile.category_keys(),
                })?,
            None => {
                let mut categories = profile.categories.values();
                match (categories.next(), categories.next()) {
                    (Some(only), None) => only,
                    _ => {
                        return Err(AgeError::MissingCategory {
                            species: profile.key.clone(),
                            expected: profile.category_keys(),
                        })
                    }
                }
            }
        };

        Ok(ResolvedCategory {
            species: profile,
            category,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMethod {
    ExactMatch,
    Interpolated,
    Extrapolated,
    Clamped,
    SinglePoint,
    Rate,
}

impl fmt::Display for ConversionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionMethod::ExactMatch => "exact_match",
            ConversionMethod::Interpolated => "interpolated",
            ConversionMethod::Extrapolated => "extrapolated",
            ConversionMethod::Clamped => "clamped",
            ConversionMethod::SinglePoint => "single_point",
            ConversionMethod::Rate => "rate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Estimate {
    pub equivalent_age: u32,
    pub method: ConversionMethod,
}

/// What to do with ages outside a point table's range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Extend the line through the first and last points.
    #[default]
    Extrapolate,
    /// Return the first or last equivalent age unchanged.
    Clamp,
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Extrapolate => f.write_str("extrapolate"),
            BoundaryPolicy::Clamp => f.write_str("clamp"),
        }
    }
}

/// The caller-held selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub species: String,
    pub category: Option<String>,
    pub age: f64,
}

impl Selection {
    pub fn new(species: &str, category: Option<&str>, age: f64) -> Self {
        Self {
            species: species.to_string(),
            category: category.map(str::to_string),
            age,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub species: String,
    pub category: String,
    pub subject_age: f64,
    pub equivalent_age: u32,
    pub method: ConversionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<LifespanRange>,
}

fn invalid_table(reason: impl Into<String>) -> AgeError {
    AgeError::InvalidTable {
        table: "unnamed".to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog() -> SpeciesProfile {
        SpeciesProfile::new("dog", "Dog")
            .with_category(Category::new(
                "small",
                "Small",
                ConversionData::Points(PointTable::from_pairs(&[(1.0, 15.0), (2.0, 24.0)]).unwrap()),
            ))
            .with_category(Category::new(
                "large",
                "Large",
                ConversionData::Points(PointTable::from_pairs(&[(1.0, 12.0), (2.0, 22.0)]).unwrap()),
            ))
    }

    fn cat() -> SpeciesProfile {
        SpeciesProfile::new("cat", "Cat").with_category(Category::new(
            "standard",
            "Standard",
            ConversionData::Points(PointTable::from_pairs(&[(1.0, 15.0)]).unwrap()),
        ))
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  African_Grey "), "african-grey");
        assert_eq!(normalize_key("african grey"), "african-grey");
        assert_eq!(normalize_key("DOG"), "dog");
    }

    #[test]
    fn test_point_table_rejects_bad_input() {
        assert!(PointTable::from_pairs(&[]).is_err());
        assert!(PointTable::from_pairs(&[(2.0, 24.0), (1.0, 15.0)]).is_err());
        assert!(PointTable::from_pairs(&[(1.0, 15.0), (1.0, 16.0)]).is_err());
        assert!(PointTable::from_pairs(&[(-1.0, 15.0)]).is_err());
        assert!(PointTable::from_pairs(&[(1.0, f64::NAN)]).is_err());
        assert!(PointTable::from_pairs(&[(1.0, 15.0)]).is_ok());
    }

    #[test]
    fn test_rate_range_rejects_bad_input() {
        assert!(RateRange::new(6.0, 5.0).is_err());
        assert!(RateRange::new(0.0, 5.0).is_err());
        assert!(RateRange::new(5.0, f64::INFINITY).is_err());
        let range = RateRange::new(5.0, 6.0).unwrap();
        assert_eq!(range.average_rate(), 5.5);
    }

    #[test]
    fn test_resolve_named_category() {
        let table = SpeciesTable::new().with_species(dog());
        let resolved = table.resolve("Dog", Some("SMALL")).unwrap();
        assert_eq!(resolved.species.key, "dog");
        assert_eq!(resolved.category.key, "small");
    }

    #[test]
    fn test_resolve_single_category_without_selection() {
        let table = SpeciesTable::new().with_species(cat());
        let resolved = table.resolve("cat", None).unwrap();
        assert_eq!(resolved.category.key, "standard");
    }

    #[test]
    fn test_resolve_errors() {
        let table = SpeciesTable::new().with_species(dog()).with_species(cat());
        assert!(matches!(
            table.resolve("hamster", None),
            Err(AgeError::UnknownSpecies { .. })
        ));
        assert!(matches!(
            table.resolve("dog", None),
            Err(AgeError::MissingCategory { .. })
        ));
        match table.resolve("dog", Some("giant")) {
            Err(AgeError::UnknownCategory { expected, .. }) => assert_eq!(expected, "large, small"),
            other => panic!("unexpected result: {:?}", other.map(|r| r.category.key.clone())),
        }
    }

    #[test]
    fn test_insert_replaces_category_with_same_key() {
        let mut table = SpeciesTable::new().with_species(dog());
        table.get_mut("DOG").unwrap().insert(Category::new(
            "Small",
            "Toy",
            ConversionData::Rate(RateRange::new(4.0, 5.0).unwrap()),
        ));

        let dog = table.get("dog").unwrap();
        assert_eq!(dog.categories.len(), 2);
        assert_eq!(dog.categories["small"].label, "Toy");
    }
}
