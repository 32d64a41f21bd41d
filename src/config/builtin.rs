//! Compiled-in reference tables.
//!
//! Loaded once on first use and shared read-only for the life of the process.

use crate::domain::model::{
    Category, ConversionData, LifespanRange, PointTable, RateRange, SpeciesProfile, SpeciesTable,
};
use once_cell::sync::Lazy;

const SMALL_DOG: &[(f64, f64)] = &[
    (1.0, 15.0),
    (2.0, 24.0),
    (3.0, 28.0),
    (4.0, 32.0),
    (5.0, 36.0),
    (6.0, 40.0),
    (7.0, 44.0),
    (8.0, 48.0),
    (9.0, 52.0),
    (10.0, 56.0),
    (11.0, 60.0),
    (12.0, 64.0),
    (13.0, 68.0),
    (14.0, 72.0),
    (15.0, 76.0),
    (16.0, 80.0),
];

const MEDIUM_DOG: &[(f64, f64)] = &[
    (1.0, 15.0),
    (2.0, 24.0),
    (3.0, 29.0),
    (4.0, 34.0),
    (5.0, 40.0),
    (6.0, 45.0),
    (7.0, 50.0),
    (8.0, 55.0),
    (9.0, 61.0),
    (10.0, 66.0),
    (11.0, 72.0),
    (12.0, 77.0),
    (13.0, 82.0),
    (14.0, 88.0),
    (15.0, 93.0),
    (16.0, 99.0),
];

const LARGE_DOG: &[(f64, f64)] = &[
    (1.0, 12.0),
    (2.0, 22.0),
    (3.0, 31.0),
    (4.0, 38.0),
    (5.0, 45.0),
    (6.0, 49.0),
    (7.0, 56.0),
    (8.0, 64.0),
    (9.0, 71.0),
    (10.0, 78.0),
    (11.0, 86.0),
    (12.0, 93.0),
    (13.0, 101.0),
    (14.0, 108.0),
    (15.0, 115.0),
    (16.0, 123.0),
];

const CAT: &[(f64, f64)] = &[
    (0.25, 4.0),
    (0.5, 10.0),
    (1.0, 15.0),
    (2.0, 24.0),
    (3.0, 28.0),
    (4.0, 32.0),
    (5.0, 36.0),
    (6.0, 40.0),
    (7.0, 44.0),
    (8.0, 48.0),
    (9.0, 52.0),
    (10.0, 56.0),
    (11.0, 60.0),
    (12.0, 64.0),
    (13.0, 68.0),
    (14.0, 72.0),
    (15.0, 76.0),
    (16.0, 80.0),
    (17.0, 84.0),
    (18.0, 88.0),
    (19.0, 92.0),
    (20.0, 96.0),
];

/// (key, label, min rate, max rate, lifespan min, lifespan max)
const BIRDS: &[(&str, &str, f64, f64, f64, f64)] = &[
    ("budgie", "Budgie", 7.0, 8.0, 5.0, 10.0),
    ("canary", "Canary", 8.0, 10.0, 8.0, 12.0),
    ("lovebird", "Lovebird", 6.0, 7.0, 10.0, 15.0),
    ("cockatiel", "Cockatiel", 5.0, 6.0, 15.0, 25.0),
    ("conure", "Conure", 3.0, 4.0, 15.0, 30.0),
    ("african-grey", "African Grey", 2.0, 3.0, 40.0, 60.0),
    ("macaw", "Macaw", 1.0, 2.0, 50.0, 80.0),
];

const DOG_TABLES: &[(&str, &str, &[(f64, f64)])] = &[
    ("small", "Small (under 10 kg)", SMALL_DOG),
    ("medium", "Medium (10-25 kg)", MEDIUM_DOG),
    ("large", "Large (over 25 kg)", LARGE_DOG),
];

static REFERENCE_TABLE: Lazy<SpeciesTable> = Lazy::new(build_reference_table);

pub fn reference_table() -> &'static SpeciesTable {
    &REFERENCE_TABLE
}

fn build_reference_table() -> SpeciesTable {
    let dog = DOG_TABLES
        .iter()
        .fold(SpeciesProfile::new("dog", "Dog"), |profile, (key, label, pairs)| {
            profile.with_category(Category::new(
                key,
                label,
                ConversionData::Points(PointTable::from_trusted_pairs(pairs)),
            ))
        });

    let cat = SpeciesProfile::new("cat", "Cat").with_category(Category::new(
        "standard",
        "Domestic cat",
        ConversionData::Points(PointTable::from_trusted_pairs(CAT)),
    ));

    let bird = BIRDS.iter().fold(
        SpeciesProfile::new("bird", "Bird"),
        |profile, &(key, label, min_rate, max_rate, min_life, max_life)| {
            profile.with_category(
                Category::new(
                    key,
                    label,
                    ConversionData::Rate(RateRange::from_trusted(min_rate, max_rate)),
                )
                .with_lifespan(LifespanRange {
                    min_years: min_life,
                    max_years: max_life,
                }),
            )
        },
    );

    SpeciesTable::new()
        .with_species(dog)
        .with_species(cat)
        .with_species(bird)
}
