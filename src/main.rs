use clap::Parser;
use pet_age::config::cli::{Command, OutputFormat};
use pet_age::config::load_species_table;
use pet_age::core::batch::convert_batch_file;
use pet_age::domain::model::{ConversionData, SpeciesTable};
use pet_age::domain::ports::ConfigProvider;
use pet_age::utils::error::ErrorSeverity;
use pet_age::utils::{logger, validation::Validate};
use pet_age::{BoundaryPolicy, Calculator, CliConfig, Conversion, ConversionMethod, Selection};
use std::path::Path;

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(&config) {
        tracing::error!(
            "❌ pet-age failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}

fn run(config: &CliConfig) -> pet_age::Result<()> {
    config.validate()?;

    let tables = load_species_table(config)?;
    let calculator = Calculator::new(tables, config.boundary_policy());
    let today = chrono::Local::now().date_naive();

    match &config.command {
        Command::Convert {
            species,
            category,
            age,
            born,
            format,
        } => {
            let conversion = match (age, born) {
                (Some(age), _) => {
                    calculator.evaluate(&Selection::new(species, category.as_deref(), *age))?
                }
                (None, Some(born)) => {
                    calculator.evaluate_birth_date(species, category.as_deref(), *born, today)?
                }
                (None, None) => {
                    return Err(pet_age::AgeError::invalid_input(
                        "",
                        "pass either --age or --born",
                    ))
                }
            };
            print_conversion(&conversion, calculator.converter().policy(), *format)?;
        }
        Command::List { format } => print_tables(calculator.tables(), *format)?,
        Command::Batch { input, output } => {
            let summary =
                convert_batch_file(&calculator, Path::new(input), Path::new(output), today)?;
            println!(
                "✅ {} rows: {} converted, {} failed",
                summary.rows, summary.converted, summary.failed
            );
            println!("📁 Output saved to: {}", output);
        }
    }

    Ok(())
}

fn print_conversion(
    conversion: &Conversion,
    policy: BoundaryPolicy,
    format: OutputFormat,
) -> pet_age::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(conversion)?),
        OutputFormat::Text => {
            println!(
                "A {:.2}-year-old {} ({}) is about {} in human years ({})",
                conversion.subject_age,
                conversion.species,
                conversion.category,
                conversion.equivalent_age,
                conversion.method
            );
            if matches!(
                conversion.method,
                ConversionMethod::Extrapolated | ConversionMethod::Clamped
            ) {
                println!("Outside the reference table (boundary policy: {})", policy);
            }
            if let Some(lifespan) = conversion.lifespan {
                println!("Typical lifespan: {}", lifespan);
            }
        }
    }
    Ok(())
}

fn print_tables(tables: &SpeciesTable, format: OutputFormat) -> pet_age::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(tables)?);
        return Ok(());
    }

    for species in tables.species() {
        println!("{} ({})", species.label, species.key);
        for category in species.categories.values() {
            let detail = match &category.data {
                ConversionData::Points(points) => format!(
                    "{} points, ages {}-{}",
                    points.len(),
                    points.first().subject_age,
                    points.last().subject_age
                ),
                ConversionData::Rate(range) => {
                    format!("{}-{} years per year", range.min_rate(), range.max_rate())
                }
            };
            match category.lifespan {
                Some(lifespan) => println!(
                    "  {:<14} {} [{}], lifespan {}",
                    category.key, category.label, detail, lifespan
                ),
                None => println!("  {:<14} {} [{}]", category.key, category.label, detail),
            }
        }
    }
    Ok(())
}
