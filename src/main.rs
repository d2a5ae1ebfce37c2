use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use dlc_rates::{
    cli::Args,
    pipeline::{RunConfig, run},
    summary::build_current_table,
    timeline::Horizon,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    // Read the clock once so the cutoff and the current snapshot agree.
    let run_date = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let horizon = Horizon { run_date, lookahead_days: args.lookahead_days };

    let mut config = RunConfig::in_dirs(&args.data_dir, &args.output_dir, horizon);
    config.max_rows = args.max_rows;
    if !args.no_html {
        config.html_path = Some(args.html_path.clone());
    }

    let result = run(&config).with_context(|| format!("failed to build rate tables from {}", args.data_dir.display()))?;
    if !args.quiet {
        println!("{}", build_current_table(&result.snapshot));
    }
    Ok(())
}
