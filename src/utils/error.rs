use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgeError {
    #[error("Invalid age input '{value}': {reason}")]
    InvalidInput { value: String, reason: String },

    #[error("Equivalent age {value} for subject age {subject_age} is too large to represent")]
    ResultOverflow { subject_age: f64, value: f64 },

    #[error("Unknown species: {species}")]
    UnknownSpecies { species: String },

    #[error("Unknown category '{category}' for {species} (expected one of: {expected})")]
    UnknownCategory {
        species: String,
        category: String,
        expected: String,
    },

    #[error("A category is required for {species} (one of: {expected})")]
    MissingCategory { species: String, expected: String },

    #[error("Invalid conversion table '{table}': {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Lookup,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AgeError {
    pub fn invalid_input(value: impl ToString, reason: impl Into<String>) -> Self {
        AgeError::InvalidInput {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// 為表格錯誤補上 `species.category` 名稱
    pub fn for_table(self, name: &str) -> Self {
        match self {
            AgeError::InvalidTable { reason, .. } => AgeError::InvalidTable {
                table: name.to_string(),
                reason,
            },
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AgeError::InvalidInput { .. } | AgeError::ResultOverflow { .. } => {
                ErrorCategory::Input
            }
            AgeError::UnknownSpecies { .. }
            | AgeError::UnknownCategory { .. }
            | AgeError::MissingCategory { .. } => ErrorCategory::Lookup,
            AgeError::InvalidTable { .. }
            | AgeError::InvalidConfigValue { .. }
            | AgeError::ConfigValidation { .. } => ErrorCategory::Configuration,
            AgeError::Io(_) | AgeError::Csv(_) | AgeError::Serialization(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Lookup => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AgeError::InvalidInput { .. } => {
                "Enter an age between 0 and 100 years, or a birth date that is not in the future"
                    .to_string()
            }
            AgeError::ResultOverflow { .. } => {
                "Check the conversion table for unrealistically large equivalent ages".to_string()
            }
            AgeError::UnknownSpecies { .. } => {
                "Run `pet-age list` to see the supported species".to_string()
            }
            AgeError::UnknownCategory { expected, .. }
            | AgeError::MissingCategory { expected, .. } => {
                format!("Pass --category with one of: {}", expected)
            }
            AgeError::InvalidTable { .. } => {
                "Check that points are sorted by age without duplicates and that rates satisfy 0 < min <= max"
                    .to_string()
            }
            AgeError::InvalidConfigValue { field, .. }
            | AgeError::ConfigValidation { field, .. } => {
                format!("Fix the '{}' setting and try again", field)
            }
            AgeError::Io(_) => "Make sure the file exists and is readable".to_string(),
            AgeError::Csv(_) => {
                "Make sure the CSV has a header row with species,category,age or species,category,born"
                    .to_string()
            }
            AgeError::Serialization(_) => "Report this as a bug".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AgeError::InvalidInput { value, reason } => {
                format!("Cannot convert age {}: {}", value, reason)
            }
            AgeError::ResultOverflow { subject_age, .. } => {
                format!("Age {} converts to a number too large to show", subject_age)
            }
            AgeError::UnknownSpecies { species } => {
                format!("'{}' is not a supported species", species)
            }
            AgeError::UnknownCategory {
                species, category, ..
            } => format!("'{}' is not a known {} category", category, species),
            AgeError::MissingCategory { species, .. } => {
                format!("Please choose a {} category", species)
            }
            AgeError::InvalidTable { table, reason } => {
                format!("Conversion table '{}' is invalid: {}", table, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgeError>;
