//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self, StepRecord};
use crate::domain::config_validation::{validate_data_config, validate_pipeline_config};
use crate::domain::error::SteptraderError;
use crate::domain::expr_parser;
use crate::domain::market::MarketData;
use crate::domain::stages::{Constraint, LogBar, SelectByExpr, WeighEqually};
use crate::domain::strategy::Strategy;
use crate::domain::universe::validate_universe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "steptrader", about = "Pipeline-composed trading signal engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the signal pipeline over CSV price history
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Write per-step target weights to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a pipeline configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Command::Run { config, output } => run_pipeline(&config, output.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SteptraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_pipeline(config_path: &PathBuf, output_path: Option<&PathBuf>) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_config = match validate_data_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let pipeline_config = match validate_pipeline_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: Load price history
    eprintln!("Loading prices from {}", data_config.prices_dir);
    let data_port = CsvAdapter::new(PathBuf::from(&data_config.prices_dir));
    let mut bars_by_code = HashMap::new();
    for code in &data_config.codes {
        match data_port.fetch_ohlcv(code) {
            Ok(bars) if !bars.is_empty() => {
                eprintln!("  {}: {} bars [OK]", code, bars.len());
                bars_by_code.insert(code.clone(), bars);
            }
            Ok(_) => eprintln!("Warning: skipping {} (no rows)", code),
            Err(e) => eprintln!("Warning: skipping {} ({})", code, e),
        }
    }
    let market = MarketData::from_bars(bars_by_code);

    // Stage 3: Validate universe against loaded data
    let universe = match validate_universe(&market, data_config.codes.clone()) {
        Ok(u) => u,
        Err(e) => {
            let err = SteptraderError::from(e);
            eprintln!("error: {err}");
            return (&err).into();
        }
    };

    // Stage 4: Build the pipeline
    let select = match SelectByExpr::new(&pipeline_config.long_expr, &pipeline_config.flat_expr) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            let err = SteptraderError::from(e);
            return (&err).into();
        }
    };
    let mut strategy = Strategy::new(
        pipeline_config.name.clone(),
        vec![
            Box::new(LogBar),
            Box::new(select),
            Box::new(WeighEqually),
            Box::new(
                Constraint::new(pipeline_config.max_weight)
                    .with_run_always(pipeline_config.constraint_run_always),
            ),
        ],
    );

    // Stage 5: Step through the timeline
    eprintln!(
        "Running '{}' over {} dates, {} codes",
        strategy.name,
        market.len(),
        universe.count()
    );
    let records = backtest::run(&mut strategy, &market, &universe.codes);
    print_summary(&records);

    // Stage 6: Optional weights output
    if let Some(path) = output_path {
        if let Err(e) = write_weights_csv(path, &records) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Wrote weights to {}", path.display());
    }

    ExitCode::SUCCESS
}

fn print_summary(records: &[StepRecord]) {
    for record in records {
        let mut weights: Vec<_> = record.weights.iter().collect();
        weights.sort_by(|a, b| a.0.cmp(b.0));
        let weights: Vec<String> = weights
            .into_iter()
            .map(|(code, w)| format!("{}={:.4}", code, w))
            .collect();
        eprintln!(
            "{} [{}] long={:?} flat={:?} weights=[{}]",
            record.date,
            if record.accepted { "ok" } else { "veto" },
            record.long,
            record.flat,
            weights.join(", ")
        );
    }
}

fn write_weights_csv(path: &PathBuf, records: &[StepRecord]) -> Result<(), SteptraderError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| SteptraderError::Data {
        reason: format!("failed to open {}: {}", path.display(), e),
    })?;

    wtr.write_record(["date", "code", "weight"])
        .map_err(|e| SteptraderError::Data {
            reason: format!("CSV write error: {}", e),
        })?;

    for record in records {
        let mut weights: Vec<_> = record.weights.iter().collect();
        weights.sort_by(|a, b| a.0.cmp(b.0));
        for (code, weight) in weights {
            wtr.write_record([
                record.date.format("%Y-%m-%d").to_string(),
                code.clone(),
                weight.to_string(),
            ])
            .map_err(|e| SteptraderError::Data {
                reason: format!("CSV write error: {}", e),
            })?;
        }
    }

    wtr.flush().map_err(SteptraderError::Io)?;
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let mut failed = false;
    for key in ["long_expr", "flat_expr"] {
        match adapter.get_string("strategy", key) {
            Some(expr) => match expr_parser::parse(&expr) {
                Ok(_) => eprintln!("{}: OK", key),
                Err(e) => {
                    eprintln!("{}: {}", key, e.display_with_context(&expr));
                    failed = true;
                }
            },
            None => {
                let err = SteptraderError::ConfigMissing {
                    section: "strategy".to_string(),
                    key: key.to_string(),
                };
                eprintln!("error: {err}");
                return (&err).into();
            }
        }
    }

    if failed {
        let err = SteptraderError::ExprParse(crate::domain::error::ParseError {
            message: "strategy contains invalid expressions".to_string(),
            position: 0,
        });
        return (&err).into();
    }

    eprintln!("Configuration OK");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_run_command() {
        let cli = Cli::parse_from(["steptrader", "run", "--config", "conf.ini"]);
        match cli.command {
            Command::Run { config, output } => {
                assert_eq!(config, PathBuf::from("conf.ini"));
                assert!(output.is_none());
            }
            _ => panic!("expected Run"),
        }
    }

    #[test]
    fn cli_parses_validate_command() {
        let cli = Cli::parse_from(["steptrader", "validate", "--config", "conf.ini"]);
        assert!(matches!(cli.command, Command::Validate { .. }));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
