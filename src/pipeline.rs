//! One full run: read the tariffs, build both timelines, write every artifact.

use std::path::PathBuf;

use log::info;

use crate::{
    error::RateResult,
    html::{self, DEFAULT_MAX_ROWS},
    model::MergedRateRow,
    normalize::{normalize_distribution, normalize_supply},
    output,
    projection::{RateSnapshot, project},
    source,
    timeline::{Horizon, TimelineKind, build_timeline},
};

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub distribution_path: PathBuf,
    pub supply_path: PathBuf,
    pub supply_tou_path: PathBuf,
    pub rates_csv_path: PathBuf,
    pub rates_tou_csv_path: PathBuf,
    pub rates_json_path: PathBuf,
    pub html_path: Option<PathBuf>,
    pub max_rows: usize,
    /// Captured once; both the cutoff and the current snapshot use it.
    pub horizon: Horizon,
}

impl RunConfig {
    /// The standard file names under `data_dir` and `output_dir`.
    pub fn in_dirs(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, horizon: Horizon) -> Self {
        let data_dir = data_dir.into();
        let output_dir = output_dir.into();
        Self {
            distribution_path: data_dir.join("distribution.csv"),
            supply_path: data_dir.join("supply.csv"),
            supply_tou_path: data_dir.join("supply_tou.csv"),
            rates_csv_path: output_dir.join("rates.csv"),
            rates_tou_csv_path: output_dir.join("rates_tou.csv"),
            rates_json_path: output_dir.join("rates.json"),
            html_path: None,
            max_rows: DEFAULT_MAX_ROWS,
            horizon,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub flat: Vec<MergedRateRow>,
    pub tou: Vec<MergedRateRow>,
    pub snapshot: RateSnapshot,
}

/// Computes both timelines and the snapshot without touching the output files.
pub fn compute(config: &RunConfig) -> RateResult<RunOutput> {
    let distribution = normalize_distribution(&source::read_distribution(&config.distribution_path)?)?;
    let supply = normalize_supply(&source::read_supply(&config.supply_path)?)?;
    let supply_tou = normalize_supply(&source::read_supply_tou(&config.supply_tou_path)?)?;

    let flat = build_timeline(TimelineKind::Flat, &distribution, &supply, config.horizon)?;
    let tou = build_timeline(TimelineKind::TimeOfUse, &distribution, &supply_tou, config.horizon)?;
    let snapshot = project(&flat, &tou, config.horizon.run_date);
    Ok(RunOutput { flat, tou, snapshot })
}

pub fn run(config: &RunConfig) -> RateResult<RunOutput> {
    info!("Running as of {} (cutoff {})", config.horizon.run_date, config.horizon.cutoff());
    let result = compute(config)?;

    output::save_rates_csv(&config.rates_csv_path, TimelineKind::Flat, &result.flat)?;
    output::save_rates_csv(&config.rates_tou_csv_path, TimelineKind::TimeOfUse, &result.tou)?;
    output::save_snapshot_json(&config.rates_json_path, &result.snapshot)?;
    if let Some(html_path) = &config.html_path {
        let report = html::render_report(&result.flat, &result.tou, config.max_rows)?;
        output::save_text(html_path, &report)?;
    }
    Ok(result)
}
