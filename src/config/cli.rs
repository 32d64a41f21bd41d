use crate::domain::model::BoundaryPolicy;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AgeError, Result};
use crate::utils::validation::{validate_file_extensions, validate_path, Validate};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "pet-age")]
#[command(about = "Convert a pet's age into human-equivalent years")]
pub struct CliConfig {
    /// TOML file with extra or replacement conversion tables
    #[arg(long, global = true)]
    pub tables: Option<String>,

    /// Use only the tables from --tables, ignoring the built-in ones
    #[arg(long, global = true)]
    pub tables_only: bool,

    /// How to treat ages outside a point table
    #[arg(long, global = true, value_enum, default_value_t = BoundaryPolicy::Extrapolate)]
    pub boundary: BoundaryPolicy,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Convert a single age
    Convert {
        #[arg(short, long)]
        species: String,

        /// Size class for dogs, variant for birds
        #[arg(short, long)]
        category: Option<String>,

        /// Age in years (fractions allowed)
        #[arg(short, long, conflicts_with = "born", required_unless_present = "born")]
        age: Option<f64>,

        /// Birth date (YYYY-MM-DD), used instead of --age
        #[arg(long)]
        born: Option<NaiveDate>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the known species and categories
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Convert every row of a CSV file
    Batch {
        #[arg(short, long)]
        input: String,

        #[arg(short, long)]
        output: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl ConfigProvider for CliConfig {
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

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.tables {
            validate_path("tables", path)?;
        } else if self.tables_only {
            return Err(AgeError::ConfigValidation {
                field: "tables_only".to_string(),
                message: "--tables-only requires --tables".to_string(),
            });
        }

        if let Command::Batch { input, output } = &self.command {
            validate_path("input", input)?;
            validate_path("output", output)?;
            validate_file_extensions("input", &[input.as_str()], &["csv"])?;
            validate_file_extensions("output", &[output.as_str()], &["csv"])?;
        }

        Ok(())
    }
}
