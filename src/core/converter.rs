//! Subject-age to equivalent-age conversion.
//!
//! [`AgeConverter`] is a pure function of its inputs and the immutable table it
//! is handed: no I/O, no logging, no hidden state. It is `Copy` and can be used
//! from any thread without coordination.

use crate::domain::model::{
    AgePoint, BoundaryPolicy, ConversionData, ConversionMethod, Estimate, PointTable, RateRange,
};
use crate::utils::error::{AgeError, Result};
use crate::utils::validation::validate_subject_age;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgeConverter {
    policy: BoundaryPolicy,
}

impl AgeConverter {
    pub fn new(policy: BoundaryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Convert `subject_age` into a rounded equivalent age.
    ///
    /// Negative, NaN and infinite ages are rejected with `InvalidInput`.
    pub fn convert(&self, data: &ConversionData, subject_age: f64) -> Result<u32> {
        self.estimate(data, subject_age)
            .map(|estimate| estimate.equivalent_age)
    }

    /// Like [`convert`](Self::convert), also reporting how the value was obtained.
    pub fn estimate(&self, data: &ConversionData, subject_age: f64) -> Result<Estimate> {
        validate_subject_age(subject_age)?;

        let (value, method) = match data {
            ConversionData::Points(table) => self.from_points(table, subject_age),
            ConversionData::Rate(range) => from_rate(range, subject_age),
        };
        estimate(subject_age, value, method)
    }

    fn from_points(&self, table: &PointTable, subject_age: f64) -> (f64, ConversionMethod) {
        let points = table.points();

        if let Some(point) = points.iter().find(|p| p.subject_age == subject_age) {
            return (point.equivalent_age, ConversionMethod::ExactMatch);
        }

        if points.len() == 1 {
            return (table.first().equivalent_age, ConversionMethod::SinglePoint);
        }

        if let Some(pair) = points
            .windows(2)
            .find(|pair| pair[0].subject_age < subject_age && subject_age < pair[1].subject_age)
        {
            return (
                interpolate(pair[0], pair[1], subject_age),
                ConversionMethod::Interpolated,
            );
        }

        // 超出表格範圍
        let (first, last) = (table.first(), table.last());
        match self.policy {
            BoundaryPolicy::Extrapolate => (
                interpolate(first, last, subject_age),
                ConversionMethod::Extrapolated,
            ),
            BoundaryPolicy::Clamp => {
                let bound = if subject_age < first.subject_age {
                    first
                } else {
                    last
                };
                (bound.equivalent_age, ConversionMethod::Clamped)
            }
        }
    }
}

fn from_rate(range: &RateRange, subject_age: f64) -> (f64, ConversionMethod) {
    (subject_age * range.average_rate(), ConversionMethod::Rate)
}

fn interpolate(lower: AgePoint, upper: AgePoint, subject_age: f64) -> f64 {
    let width = upper.subject_age - lower.subject_age;
    if width == 0.0 {
        return lower.equivalent_age;
    }
    let ratio = (subject_age - lower.subject_age) / width;
    lower.equivalent_age + ratio * (upper.equivalent_age - lower.equivalent_age)
}

/// `f64::round` rounds half away from zero: 19.5 becomes 20, never 19.
/// Extrapolation below the table can dip under zero; that floors at 0.
/// Values that do not fit a `u32` are an error, never saturated.
fn estimate(subject_age: f64, value: f64, method: ConversionMethod) -> Result<Estimate> {
    let rounded = value.max(0.0).round();
    if !rounded.is_finite() || rounded > u32::MAX as f64 {
        return Err(AgeError::ResultOverflow {
            subject_age,
            value: rounded,
        });
    }
    Ok(Estimate {
        equivalent_age: rounded as u32,
        method,
    })
}
