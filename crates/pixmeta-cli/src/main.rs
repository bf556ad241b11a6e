use anyhow::{Context, Result};
use clap::Parser;
use pixmeta_cli::{
    collect_inputs, Cli, Commands, Config, ConfigCommands, OutputFormatter, OutputMode,
    ProgressReporter,
};
use pixmeta_core::{BatchJob, BatchProcessor};
use std::time::Instant;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        "pixmeta=debug"
    } else {
        "pixmeta=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let mut config = Config::load()?;

    // Override config with CLI flags
    if cli.no_color {
        config.colored_output = false;
    }
    if cli.no_progress {
        config.show_progress = false;
    }
    if cli.jobs > 0 {
        config.parallel_jobs = cli.jobs;
    }

    let formatter = OutputFormatter::new(config.colored_output);
    let progress = ProgressReporter::new(config.show_progress);

    match cli.command {
        Commands::Analyze {
            inputs,
            recursive,
            output,
        } => {
            let mode = match output {
                Some(mode) => mode,
                None => config.output_mode()?,
            };
            handle_analyze(inputs, recursive, mode, &config, &formatter, &progress).await?;
        }

        Commands::Config { action } => {
            handle_config(action, &formatter)?;
        }
    }

    Ok(())
}

async fn handle_analyze(
    inputs: Vec<String>,
    recursive: bool,
    mode: OutputMode,
    config: &Config,
    formatter: &OutputFormatter,
    progress: &ProgressReporter,
) -> Result<()> {
    let files = collect_inputs(&inputs, recursive)?;

    let names: Vec<String> = files
        .iter()
        .map(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect();
    config
        .batch_policy()
        .validate(&names)
        .context("Batch rejected")?;

    if mode == OutputMode::Table {
        formatter.info(&format!("Found {} files to analyze", files.len()));
    }

    let jobs: Vec<BatchJob> = files.into_iter().map(BatchJob::from_path).collect();
    let processor = BatchProcessor::new(config.parallel_jobs);
    let pb = progress.create_bar(jobs.len() as u64, "Analyzing...");

    let started = Instant::now();
    let (tx, rx) = mpsc::unbounded_channel();
    let (reports, last) = tokio::join!(
        processor.process_batch(jobs, tx),
        ProgressReporter::follow(pb.clone(), rx)
    );
    let elapsed = started.elapsed();

    let failed = last.map(|p| p.failed.len()).unwrap_or(0);
    if failed == 0 {
        ProgressReporter::finish_bar(&pb, "Analysis complete");
    } else {
        ProgressReporter::finish_bar_error(&pb, &format!("{} files not analyzed", failed));
    }

    match mode {
        OutputMode::Table => {
            print!("{}", formatter.render_table(&reports));
            formatter.print_batch_summary(&reports, elapsed);
        }
        OutputMode::Json => {
            println!("{}", formatter.render_json(&reports)?);
        }
    }

    Ok(())
}

fn handle_config(action: ConfigCommands, formatter: &OutputFormatter) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = Config::load()?;
            let toml = toml::to_string_pretty(&config)?;
            println!("{}", toml);
        }

        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            formatter.success(&format!("Set {} = {}", key, value));
        }

        ConfigCommands::Reset => {
            Config::reset()?;
            formatter.success("Configuration reset to defaults");
        }

        ConfigCommands::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
