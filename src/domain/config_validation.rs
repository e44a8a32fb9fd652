//! Configuration validation.
//!
//! Extracts and validates every config field before the pipeline is built,
//! so a broken strategy definition fails here rather than mid-run.

use crate::domain::error::SteptraderError;
use crate::domain::expr_parser;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone)]
pub struct DataConfig {
    pub prices_dir: String,
    pub codes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub name: String,
    pub long_expr: String,
    pub flat_expr: String,
    pub max_weight: Option<f64>,
    pub constraint_run_always: bool,
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<DataConfig, SteptraderError> {
    let prices_dir = require_string(config, "data", "prices_dir")?;
    let codes_raw = require_string(config, "universe", "codes")?;
    let codes = crate::domain::universe::parse_codes(&codes_raw)?;
    Ok(DataConfig { prices_dir, codes })
}

pub fn validate_pipeline_config(
    config: &dyn ConfigPort,
) -> Result<PipelineConfig, SteptraderError> {
    let name = config
        .get_string("strategy", "name")
        .unwrap_or_else(|| "unnamed".to_string());
    let long_expr = require_string(config, "strategy", "long_expr")?;
    let flat_expr = require_string(config, "strategy", "flat_expr")?;

    expr_parser::parse(&long_expr).map_err(|e| invalid("strategy", "long_expr", &e))?;
    expr_parser::parse(&flat_expr).map_err(|e| invalid("strategy", "flat_expr", &e))?;

    let max_weight = validate_max_weight(config)?;
    let constraint_run_always = config.get_bool("constraint", "run_always", true);

    Ok(PipelineConfig {
        name,
        long_expr,
        flat_expr,
        max_weight,
        constraint_run_always,
    })
}

fn validate_max_weight(config: &dyn ConfigPort) -> Result<Option<f64>, SteptraderError> {
    match config.get_string("constraint", "max_weight") {
        None => Ok(None),
        Some(raw) => {
            let value: f64 = raw.trim().parse().map_err(|_| SteptraderError::ConfigInvalid {
                section: "constraint".to_string(),
                key: "max_weight".to_string(),
                reason: format!("not a number: {}", raw),
            })?;
            if value <= 0.0 || value > 1.0 {
                return Err(SteptraderError::ConfigInvalid {
                    section: "constraint".to_string(),
                    key: "max_weight".to_string(),
                    reason: "max_weight must be in (0, 1]".to_string(),
                });
            }
            Ok(Some(value))
        }
    }
}

fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, SteptraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(SteptraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn invalid(
    section: &str,
    key: &str,
    err: &crate::domain::error::ParseError,
) -> SteptraderError {
    SteptraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: err.to_string(),
    }
}
