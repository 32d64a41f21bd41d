use crate::core::birth_date::age_from_birth_date;
use crate::core::converter::AgeConverter;
use crate::domain::model::{BoundaryPolicy, Conversion, Selection};
use crate::domain::ports::TableProvider;
use crate::utils::error::{AgeError, Result};
use crate::utils::validation::validate_subject_age;
use chrono::NaiveDate;

/// Largest age accepted from a user.
pub const MAX_SUBJECT_AGE: f64 = 100.0;

/// Resolves a [`Selection`] against a table provider and converts it.
///
/// Holds no per-call state; the caller owns the selection and calls
/// [`evaluate`](Self::evaluate) whenever any part of it changes.
pub struct Calculator<P: TableProvider> {
    tables: P,
    converter: AgeConverter,
}

impl<P: TableProvider> Calculator<P> {
    pub fn new(tables: P, policy: BoundaryPolicy) -> Self {
        Self {
            tables,
            converter: AgeConverter::new(policy),
        }
    }

    pub fn tables(&self) -> &P {
        &self.tables
    }

    pub fn converter(&self) -> AgeConverter {
        self.converter
    }

    pub fn evaluate(&self, selection: &Selection) -> Result<Conversion> {
        validate_subject_age(selection.age)?;
        if selection.age > MAX_SUBJECT_AGE {
            return Err(AgeError::invalid_input(
                selection.age,
                format!("age must be between 0 and {}", MAX_SUBJECT_AGE),
            ));
        }

        let resolved = self
            .tables
            .resolve(&selection.species, selection.category.as_deref())?;
        let estimate = self
            .converter
            .estimate(&resolved.category.data, selection.age)?;

        tracing::debug!(
            species = %resolved.species.key,
            category = %resolved.category.key,
            age = selection.age,
            equivalent_age = estimate.equivalent_age,
            method = %estimate.method,
            "converted age"
        );

        Ok(Conversion {
            species: resolved.species.key.clone(),
            category: resolved.category.key.clone(),
            subject_age: selection.age,
            equivalent_age: estimate.equivalent_age,
            method: estimate.method,
            lifespan: resolved.category.lifespan,
        })
    }

    /// 以出生日期計算年齡後再換算
    pub fn evaluate_birth_date(
        &self,
        species: &str,
        category: Option<&str>,
        born: NaiveDate,
        today: NaiveDate,
    ) -> Result<Conversion> {
        let age = age_from_birth_date(born, today)?;
        self.evaluate(&Selection::new(species, category, age))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin::reference_table;
    use crate::domain::model::ConversionMethod;

    fn calculator() -> Calculator<crate::domain::model::SpeciesTable> {
        Calculator::new(reference_table().clone(), BoundaryPolicy::default())
    }

    #[test]
    fn test_evaluate_dog_selection() {
        let conversion = calculator()
            .evaluate(&Selection::new("dog", Some("medium"), 5.0))
            .unwrap();
        assert_eq!(conversion.species, "dog");
        assert_eq!(conversion.category, "medium");
        assert_eq!(conversion.equivalent_age, 40);
        assert_eq!(conversion.method, ConversionMethod::ExactMatch);
        assert!(conversion.lifespan.is_none());
    }

    #[test]
    fn test_evaluate_cat_without_category() {
        let conversion = calculator()
            .evaluate(&Selection::new("Cat", None, 0.5))
            .unwrap();
        assert_eq!(conversion.category, "standard");
        assert_eq!(conversion.equivalent_age, 10);
    }

    #[test]
    fn test_evaluate_bird_reports_lifespan() {
        let conversion = calculator()
            .evaluate(&Selection::new("bird", Some("Cockatiel"), 3.0))
            .unwrap();
        assert_eq!(conversion.equivalent_age, 17);
        assert_eq!(conversion.method, ConversionMethod::Rate);
        assert_eq!(conversion.lifespan.unwrap().min_years, 15.0);
    }

    #[test]
    fn test_evaluate_rejects_out_of_range_ages() {
        let calculator = calculator();
        for age in [-1.0, 100.5, f64::NAN] {
            let result = calculator.evaluate(&Selection::new("dog", Some("small"), age));
            assert!(matches!(result, Err(AgeError::InvalidInput { .. })));
        }
        assert!(calculator
            .evaluate(&Selection::new("dog", Some("small"), 100.0))
            .is_ok());
    }

    #[test]
    fn test_evaluate_invalid_age_before_lookup() {
        // an invalid age wins over an unknown species
        let result = calculator().evaluate(&Selection::new("dragon", None, -3.0));
        assert!(matches!(result, Err(AgeError::InvalidInput { .. })));
    }

    #[test]
    fn test_calculator_keeps_boundary_policy() {
        let calculator = Calculator::new(reference_table().clone(), BoundaryPolicy::Clamp);
        assert_eq!(calculator.converter().policy(), BoundaryPolicy::Clamp);
        assert_eq!(calculator.converter().policy().to_string(), "clamp");

        let conversion = calculator
            .evaluate(&Selection::new("dog", Some("small"), 20.0))
            .unwrap();
        assert_eq!(conversion.method, ConversionMethod::Clamped);
        assert_eq!(conversion.equivalent_age, 80);
    }

    #[test]
    fn test_evaluate_birth_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let born = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        let conversion = calculator()
            .evaluate_birth_date("dog", Some("small"), born, today)
            .unwrap();
        // 731 days is just over two years
        assert_eq!(conversion.equivalent_age, 24);

        let future = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(calculator()
            .evaluate_birth_date("dog", Some("small"), future, today)
            .is_err());
    }
}
