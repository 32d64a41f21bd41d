use crate::core::calculator::Calculator;
use crate::domain::model::{ConversionMethod, Selection};
use crate::domain::ports::TableProvider;
use crate::utils::error::{AgeError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// One input line. Exactly one of `age` and `born` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRow {
    pub species: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub born: Option<NaiveDate>,
}

/// One output line. A failed row keeps `equivalent_age` empty and fills `error`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub species: String,
    pub category: String,
    pub age: Option<f64>,
    pub equivalent_age: Option<u32>,
    pub method: Option<ConversionMethod>,
    pub error: Option<String>,
}

const OUTPUT_HEADER: [&str; 6] = [
    "species",
    "category",
    "age",
    "equivalent_age",
    "method",
    "error",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows: usize,
    pub converted: usize,
    pub failed: usize,
}

/// 逐列換算 CSV；單列失敗不會中止整批
pub fn convert_batch<P, R, W>(
    calculator: &Calculator<P>,
    input: R,
    output: W,
    today: NaiveDate,
) -> Result<BatchSummary>
where
    P: TableProvider,
    R: Read,
    W: Write,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    writer.write_record(OUTPUT_HEADER)?;

    let headers = reader.headers()?.clone();
    let species_column = headers.iter().position(|h| h == "species");
    let category_column = headers.iter().position(|h| h == "category");

    let mut summary = BatchSummary::default();
    // 讀取失敗 (I/O) 仍中止整批；內容錯誤只記在該列
    for (index, record) in reader.byte_records().enumerate() {
        let record = record?;
        summary.rows += 1;

        let raw = |column: Option<usize>| {
            column
                .and_then(|i| record.get(i))
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .unwrap_or_default()
        };

        let result = match csv::StringRecord::from_byte_record(record.clone()) {
            Ok(text) => match text.deserialize::<BatchRow>(Some(&headers)) {
                Ok(row) => convert_row(calculator, &row, today),
                Err(e) => failed_row(
                    raw(species_column),
                    raw(category_column),
                    None,
                    AgeError::from(e).user_friendly_message(),
                ),
            },
            Err(e) => failed_row(
                raw(species_column),
                raw(category_column),
                None,
                format!("Row is not valid UTF-8: {}", e.utf8_error()),
            ),
        };

        match &result.error {
            Some(error) => {
                summary.failed += 1;
                tracing::warn!("⚠️ Row {} could not be converted: {}", index + 1, error);
            }
            None => summary.converted += 1,
        }
        writer.serialize(&result)?;
    }

    writer.flush()?;
    tracing::info!(
        "✅ Batch finished: {} rows, {} converted, {} failed",
        summary.rows,
        summary.converted,
        summary.failed
    );
    Ok(summary)
}

pub fn convert_batch_file<P: TableProvider>(
    calculator: &Calculator<P>,
    input: &Path,
    output: &Path,
    today: NaiveDate,
) -> Result<BatchSummary> {
    tracing::info!(
        "📁 Converting {} into {}",
        input.display(),
        output.display()
    );
    let reader = File::open(input)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let writer = File::create(output)?;

    convert_batch(calculator, reader, writer, today)
}

fn convert_row<P: TableProvider>(
    calculator: &Calculator<P>,
    row: &BatchRow,
    today: NaiveDate,
) -> BatchResult {
    let category = row.category.as_deref().filter(|c| !c.is_empty());
    let outcome = match (row.age, row.born) {
        (Some(_), Some(born)) => Err(AgeError::invalid_input(
            born,
            "give either age or born, not both",
        )),
        (Some(age), None) => calculator.evaluate(&Selection::new(&row.species, category, age)),
        (None, Some(born)) => calculator.evaluate_birth_date(&row.species, category, born, today),
        (None, None) => Err(AgeError::invalid_input("", "row has neither age nor born")),
    };

    match outcome {
        Ok(conversion) => BatchResult {
            species: conversion.species,
            category: conversion.category,
            age: Some(round_age(conversion.subject_age)),
            equivalent_age: Some(conversion.equivalent_age),
            method: Some(conversion.method),
            error: None,
        },
        Err(e) => failed_row(
            row.species.clone(),
            row.category.clone().unwrap_or_default(),
            row.age,
            e.user_friendly_message(),
        ),
    }
}

fn failed_row(species: String, category: String, age: Option<f64>, message: String) -> BatchResult {
    BatchResult {
        species,
        category,
        age,
        equivalent_age: None,
        method: None,
        error: Some(message),
    }
}

/// 出生日期換算出的年齡保留兩位小數
fn round_age(age: f64) -> f64 {
    (age * 100.0).round() / 100.0
}
