use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::{html::DEFAULT_MAX_ROWS, timeline::DEFAULT_LOOKAHEAD_DAYS};

/// Build effective-dated residential rate tables from the distribution and
/// supply tariffs.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Directory holding `distribution.csv`, `supply.csv` and `supply_tou.csv`.
    #[clap(long, default_value = "data", env = "RATES_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Directory receiving `rates.csv`, `rates_tou.csv` and `rates.json`.
    #[clap(long, default_value = "output", env = "RATES_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Where to write the HTML report.
    #[clap(long, default_value = "docs/index.html", env = "RATES_HTML_PATH")]
    pub html_path: PathBuf,

    /// Skip the HTML report.
    #[clap(long)]
    pub no_html: bool,

    /// How many days past the run date the timeline may reach.
    #[clap(long, default_value_t = DEFAULT_LOOKAHEAD_DAYS, env = "RATES_LOOKAHEAD_DAYS")]
    pub lookahead_days: u64,

    /// Rows per table shown before "Show More" in the HTML report.
    #[clap(long, default_value_t = DEFAULT_MAX_ROWS, env = "RATES_MAX_ROWS")]
    pub max_rows: usize,

    /// Run as of this date (`YYYY-MM-DD`) instead of today.
    #[clap(long = "as-of", env = "RATES_AS_OF")]
    pub as_of: Option<NaiveDate>,

    /// Do not print the current rates table.
    #[clap(long, short)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["dlc-rates"]).unwrap();
        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert_eq!(args.lookahead_days, 60);
        assert_eq!(args.max_rows, 20);
        assert!(args.as_of.is_none());
    }

    #[test]
    fn parses_run_date() {
        let args = Args::try_parse_from(["dlc-rates", "--as-of", "2024-07-04", "--no-html"]).unwrap();
        assert_eq!(args.as_of, NaiveDate::from_ymd_opt(2024, 7, 4));
        assert!(args.no_html);
        assert!(Args::try_parse_from(["dlc-rates", "--as-of", "07/04/2024"]).is_err());
    }
}
