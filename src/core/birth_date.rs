use crate::utils::error::{AgeError, Result};
use chrono::NaiveDate;

const DAYS_PER_YEAR: f64 = 365.25;

/// Fractional age in years between `born` and `today`.
pub fn age_from_birth_date(born: NaiveDate, today: NaiveDate) -> Result<f64> {
    if born > today {
        return Err(AgeError::invalid_input(
            born,
            format!("birth date is after {}", today),
        ));
    }
    let days = (today - born).num_days();
    Ok(days as f64 / DAYS_PER_YEAR)
}
