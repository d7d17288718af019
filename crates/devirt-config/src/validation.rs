use crate::diagnostics::{ConfigValidationError, ConfigWarning, ValidationDiagnostics};
use crate::{DevirtConfig, LoggingConfig};

impl DevirtConfig {
    /// Checks semantic invariants, reporting every problem found in one pass.
    #[must_use]
    pub fn validate(&self) -> ValidationDiagnostics {
        let mut out = ValidationDiagnostics::default();
        validate_analysis(self, &mut out);
        validate_logging(self, &mut out);
        out
    }
}

fn validate_analysis(config: &DevirtConfig, out: &mut ValidationDiagnostics) {
    let analysis = &config.analysis;
    if analysis.root_type.trim().is_empty() {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: "analysis.root_type".to_string(),
            message: "must not be empty".to_string(),
        });
    } else if analysis.root_type.contains('.') && !analysis.root_type.contains('/') {
        out.warnings.push(ConfigWarning::RootTypeNotInternalName {
            value: analysis.root_type.clone(),
        });
    }

    if analysis.root_store.trim().is_empty() {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: "analysis.root_store".to_string(),
            message: "must not be empty".to_string(),
        });
    }
}

fn validate_logging(config: &DevirtConfig, out: &mut ValidationDiagnostics) {
    let normalized = LoggingConfig::normalize_level_directives(&config.logging.level);
    if !config.logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.warnings.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
        });
    }
}
