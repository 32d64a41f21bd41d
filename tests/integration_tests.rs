use anyhow::Result;
use chrono::NaiveDate;
use pet_age::config::load_species_table;
use pet_age::core::batch::convert_batch_file;
use pet_age::domain::ports::ConfigProvider;
use pet_age::{AgeError, BoundaryPolicy, Calculator, ConversionMethod, Selection};
use std::io::Write;
use tempfile::TempDir;

struct FileConfig {
    tables: Option<String>,
    tables_only: bool,
    boundary: BoundaryPolicy,
}

impl ConfigProvider for FileConfig {
    fn tables_path(&self) -> Option<&str> {
        self.tables.as_deref()
    }

    fn tables_only(&self) -> bool {
        self.tables_only
    }

    fn boundary_policy(&self) -> BoundaryPolicy {
        self.boundary
    }
}

const EXTRA_TABLES: &str = r#"
[species.rabbit]
label = "Rabbit"

[species.rabbit.categories.standard]
points = [[1, 21], [2, 27], [3, 33], [4, 39]]

[species.bird.categories.cockatiel]
label = "Cockatiel (slow)"
rate = { min = 4, max = 4 }
lifespan = { min = 15, max = 25 }
"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> Result<String> {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(path.to_string_lossy().to_string())
}

#[test]
fn test_end_to_end_with_custom_tables() -> Result<()> {
    let dir = TempDir::new()?;
    let tables = write_file(&dir, "tables.toml", EXTRA_TABLES)?;

    let config = FileConfig {
        tables: Some(tables),
        tables_only: false,
        boundary: BoundaryPolicy::Extrapolate,
    };
    let calculator = Calculator::new(load_species_table(&config)?, config.boundary_policy());

    let rabbit = calculator.evaluate(&Selection::new("rabbit", None, 2.5))?;
    assert_eq!(rabbit.equivalent_age, 30);
    assert_eq!(rabbit.method, ConversionMethod::Interpolated);

    // overridden category
    let cockatiel = calculator.evaluate(&Selection::new("bird", Some("cockatiel"), 3.0))?;
    assert_eq!(cockatiel.equivalent_age, 12);

    // untouched built-ins still resolve
    let dog = calculator.evaluate(&Selection::new("dog", Some("small"), 1.5))?;
    assert_eq!(dog.equivalent_age, 20);
    Ok(())
}

#[test]
fn test_clamp_policy_from_config() -> Result<()> {
    let config = FileConfig {
        tables: None,
        tables_only: false,
        boundary: BoundaryPolicy::Clamp,
    };
    let calculator = Calculator::new(load_species_table(&config)?, config.boundary_policy());

    let old_dog = calculator.evaluate(&Selection::new("dog", Some("small"), 20.0))?;
    assert_eq!(old_dog.equivalent_age, 80);
    assert_eq!(old_dog.method, ConversionMethod::Clamped);

    let puppy = calculator.evaluate(&Selection::new("dog", Some("large"), 0.5))?;
    assert_eq!(puppy.equivalent_age, 12);
    Ok(())
}

#[test]
fn test_extrapolation_beyond_table() -> Result<()> {
    let config = FileConfig {
        tables: None,
        tables_only: false,
        boundary: BoundaryPolicy::Extrapolate,
    };
    let calculator = Calculator::new(load_species_table(&config)?, config.boundary_policy());

    // small dog chord (1, 15) .. (16, 80): 15 + 19/15 * 65 = 97.33
    let old_dog = calculator.evaluate(&Selection::new("dog", Some("small"), 20.0))?;
    assert_eq!(old_dog.equivalent_age, 97);
    assert_eq!(old_dog.method, ConversionMethod::Extrapolated);
    Ok(())
}

#[test]
fn test_invalid_tables_file_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let tables = write_file(
        &dir,
        "broken.toml",
        "[species.dog.categories.small]\npoints = [[1, 15], [1, 16]]\n",
    )?;

    let config = FileConfig {
        tables: Some(tables),
        tables_only: false,
        boundary: BoundaryPolicy::Extrapolate,
    };
    match load_species_table(&config) {
        Err(AgeError::InvalidTable { table, reason }) => {
            assert_eq!(table, "dog.small");
            assert!(reason.contains("duplicate"));
        }
        other => panic!("expected InvalidTable, got {:?}", other.map(|t| t.len())),
    }
    Ok(())
}

#[test]
fn test_batch_file_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_file(
        &dir,
        "pets.csv",
        "species,category,age,born\n\
         dog,medium,5,\n\
         cat,,,2023-01-01\n\
         bird,macaw,-2,\n\
         dog,Large,3,\n",
    )?;
    let output = dir.path().join("out").join("results.csv");

    let calculator = Calculator::new(pet_age::reference_table().clone(), BoundaryPolicy::default());
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let summary = convert_batch_file(&calculator, std::path::Path::new(&input), &output, today)?;

    assert_eq!(summary.rows, 4);
    assert_eq!(summary.converted, 3);
    assert_eq!(summary.failed, 1);

    let mut reader = csv::Reader::from_path(&output)?;
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    assert_eq!(&rows[0][3], "40");
    assert_eq!(&rows[1][1], "standard");
    assert_eq!(&rows[1][3], "15");
    assert_eq!(&rows[2][3], "");
    assert!(rows[2][5].contains("negative"));
    assert_eq!(&rows[3][1], "large");
    assert_eq!(&rows[3][3], "31");
    Ok(())
}
