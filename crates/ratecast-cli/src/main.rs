//! # ratecast-cli
//!
//! Command-line interface for forecasting an interest rate from CSV series.

use clap::{Parser, Subcommand};
use ratecast_facade::prelude::*;
use ratecast_facade::StationarityAnalyzer;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = std::result::Result<T, String>;

#[derive(Parser)]
#[command(name = "ratecast")]
#[command(about = "Interest-rate forecasting with causality-screened regressors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build features, select models and compare them on a holdout
    Run {
        /// Directory holding `<NAME>.csv` files
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Target rate series name
        #[arg(short, long)]
        target: String,

        /// Candidate regressor as NAME[:LAG[+EXTRA...]][:last|:mean][:contemporaneous];
        /// `mean` reads daily data, lag 0 needs `contemporaneous`
        #[arg(short, long = "regressor", value_parser = parse_regressor)]
        regressors: Vec<RegressorArg>,

        /// Run configuration (JSON, every field optional)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report the differencing order a series needs
    Stationarity {
        /// Directory holding `<NAME>.csv` files
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Series name
        #[arg(short, long)]
        series: String,

        /// Run configuration (JSON, every field optional)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Regressor as given on the command line.
#[derive(Debug, Clone, PartialEq)]
struct RegressorArg {
    name: String,
    lag: Option<usize>,
    extra_lags: Vec<usize>,
    aggregation: Aggregation,
    contemporaneous: bool,
}

impl RegressorArg {
    /// Regressor spec on top of the configured defaults.
    fn spec(&self, config: &RunConfig) -> RegressorSpec {
        let mut spec = config.regressor(&self.name).with_aggregation(self.aggregation);
        if let Some(lag) = self.lag {
            spec.reporting_lag = lag;
        }
        for &lag in &self.extra_lags {
            spec = spec.with_extra_lag(lag);
        }
        if self.contemporaneous {
            spec = spec.contemporaneous();
        }
        spec
    }
}

/// Parse `NAME[:LAG[+EXTRA...]][:last|:mean][:contemporaneous]`.
///
/// An empty lag field keeps the configured reporting lag, so `CPI::mean` is
/// valid. `CPI:1+2+3` adds features at lags 2 and 3.
fn parse_regressor(raw: &str) -> CliResult<RegressorArg> {
    let mut parts = raw.split(':');
    let name = parts
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("Missing regressor name in '{}'", raw))?
        .to_string();

    let parse_lag = |l: &str| {
        l.parse::<usize>()
            .map_err(|e| format!("Bad lag '{}' for {}: {}", l, name, e))
    };
    let (lag, extra_lags) = match parts.next().filter(|l| !l.is_empty()) {
        None => (None, Vec::new()),
        Some(field) => {
            let mut lags = field.split('+');
            let lag = lags.next().map(parse_lag).transpose()?;
            let extra = lags.map(parse_lag).collect::<CliResult<Vec<_>>>()?;
            (lag, extra)
        }
    };

    let mut aggregation = None;
    let mut contemporaneous = false;
    for flag in parts {
        match flag {
            "last" | "mean" if aggregation.is_some() => {
                return Err(format!("Aggregation given twice in '{}'", raw));
            }
            "last" => aggregation = Some(Aggregation::Last),
            "mean" => aggregation = Some(Aggregation::Mean),
            "contemporaneous" if contemporaneous => {
                return Err(format!("Too many fields in '{}'", raw));
            }
            "contemporaneous" => contemporaneous = true,
            other => {
                return Err(format!(
                    "Unknown field '{}'. Use 'last', 'mean' or 'contemporaneous'",
                    other
                ))
            }
        }
    }

    Ok(RegressorArg {
        name,
        lag,
        extra_lags,
        aggregation: aggregation.unwrap_or_default(),
        contemporaneous,
    })
}

/// Load a run configuration from JSON, or the defaults
fn load_config(path: Option<&Path>) -> CliResult<RunConfig> {
    let config = match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("Failed to open config: {}", e))?;
            serde_json::from_reader(BufReader::new(file))
                .map_err(|e| format!("Failed to parse config: {}", e))?
        }
        None => RunConfig::default(),
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn fetch(source: &PrioritizedSource, request: SeriesRequest) -> CliResult<TimeSeries> {
    let sourced = source.fetch(&request).map_err(|e| e.to_string())?;
    info!(
        series = %request.name,
        kind = %sourced.kind,
        origin = %sourced.origin,
        rows = sourced.series.len(),
        "Loaded series"
    );
    Ok(sourced.series)
}

fn emit<T: Serialize>(value: &T, output: Option<PathBuf>) -> CliResult<()> {
    match output {
        Some(path) => {
            let mut file =
                File::create(&path).map_err(|e| format!("Failed to create output: {}", e))?;
            serde_json::to_writer_pretty(&mut file, value)
                .map_err(|e| format!("Failed to write JSON: {}", e))?;
            info!(path = %path.display(), "Results written");
        }
        None => {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| format!("Failed to serialize JSON: {}", e))?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Run the full pipeline for one target
fn run_forecast(
    data_dir: PathBuf,
    target: String,
    regressors: Vec<RegressorArg>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let config = load_config(config.as_deref())?;
    let source = PrioritizedSource::new().then(CsvFileSource::new(&data_dir));

    let target_series = fetch(&source, SeriesRequest::monthly(&target))?;
    let mut inputs = Vec::with_capacity(regressors.len());
    for arg in regressors {
        let cadence = match arg.aggregation {
            Aggregation::Mean => Cadence::Daily,
            Aggregation::Last => Cadence::Monthly,
        };
        let series = fetch(&source, SeriesRequest::monthly(&arg.name).with_cadence(cadence))?;
        inputs.push(Regressor::new(arg.spec(&config), series));
    }

    let pipeline = RatePipeline::new(config).map_err(|e| e.to_string())?;
    let outcome = pipeline
        .run(&target_series, &inputs)
        .map_err(|e| e.to_string())?;

    for flag in outcome.diagnostics() {
        info!(flag = flag.code(), "Diagnostic");
    }
    emit(&outcome, output)
}

/// Run the unit-root analysis on one series
fn run_stationarity(data_dir: PathBuf, series: String, config: Option<PathBuf>) -> CliResult<()> {
    let config = load_config(config.as_deref())?;
    let source = PrioritizedSource::new().then(CsvFileSource::new(&data_dir));
    let values = fetch(&source, SeriesRequest::monthly(&series))?;

    let result = StationarityAnalyzer::from_config(&config)
        .analyze(&values)
        .map_err(|e| e.to_string())?;
    emit(&result, None)
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            data_dir,
            target,
            regressors,
            config,
            output,
        } => run_forecast(data_dir, target, regressors, config, output),

        Commands::Stationarity {
            data_dir,
            series,
            config,
        } => run_stationarity(data_dir, series, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regressor_forms() {
        assert_eq!(
            parse_regressor("CPI").unwrap(),
            RegressorArg {
                name: "CPI".to_string(),
                lag: None,
                extra_lags: Vec::new(),
                aggregation: Aggregation::Last,
                contemporaneous: false,
            }
        );
        let fx = parse_regressor("FX:0:mean:contemporaneous").unwrap();
        assert_eq!(fx.lag, Some(0));
        assert_eq!(fx.aggregation, Aggregation::Mean);
        assert!(fx.contemporaneous);

        let cpi = parse_regressor("CPI:1+2+3").unwrap();
        assert_eq!(cpi.lag, Some(1));
        assert_eq!(cpi.extra_lags, vec![2, 3]);

        let oil = parse_regressor("OIL::mean").unwrap();
        assert_eq!(oil.lag, None);
        assert_eq!(oil.aggregation, Aggregation::Mean);
    }

    #[test]
    fn test_regressor_arg_builds_spec() {
        let config = RunConfig::default();
        let spec = parse_regressor("CPI:1+2").unwrap().spec(&config);
        assert_eq!(spec.lags(), vec![1, 2]);
        assert_eq!(spec.feature_name(2), "CPI_lag2");
        assert!(!spec.contemporaneous);

        let spec = parse_regressor("FX:0:contemporaneous").unwrap().spec(&config);
        assert_eq!(spec.reporting_lag, 0);
        assert!(spec.contemporaneous);

        let spec = parse_regressor("OIL::mean").unwrap().spec(&config);
        assert_eq!(spec.reporting_lag, config.default_reporting_lag);
        assert_eq!(spec.aggregation, Aggregation::Mean);
    }

    #[test]
    fn test_parse_regressor_rejects_garbage() {
        assert!(parse_regressor("").is_err());
        assert!(parse_regressor("CPI:x").is_err());
        assert!(parse_regressor("CPI:1+").is_err());
        assert!(parse_regressor("CPI:1:median").is_err());
        assert!(parse_regressor("CPI:1:mean:extra").is_err());
        assert!(parse_regressor("CPI:1:mean:last").is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "ratecast", "run", "--data-dir", "data", "--target", "TBILL_3M", "-r", "CPI:1", "-r",
            "FX:1:mean",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { regressors, .. } => assert_eq!(regressors.len(), 2),
            _ => panic!("expected run"),
        }
    }
}
