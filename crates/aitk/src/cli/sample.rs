//! The `aitk sample` command: expand a job file's `[sample]` prompts.

use aitk_core::JobConfig;
use clap::Args;
use std::path::PathBuf;

use super::output::{write_items, OutputFormat};
use super::resolve::ResolvedRecord;

/// Arguments for the `sample` command.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Job config file (TOML)
    #[arg(required = true)]
    pub job: PathBuf,

    /// Folder the sample images would be written to
    #[arg(long)]
    pub output_folder: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// Execute the sample command.
pub fn execute(args: SampleArgs) -> anyhow::Result<()> {
    let job = JobConfig::load_from(&args.job)?;
    let configs = job.sample.generate_configs(&args.output_folder)?;
    if configs.is_empty() {
        tracing::warn!("Job file {} has no sample prompts", args.job.display());
    }

    let max_count = configs.len() as u64;
    let records: Vec<ResolvedRecord<'_>> = configs
        .iter()
        .zip(0u64..)
        .map(|(config, count)| ResolvedRecord::new(config, [count], max_count))
        .collect();

    tracing::info!("Resolved {} sample configs", records.len());
    write_items(std::io::stdout().lock(), &records, args.format)?;
    Ok(())
}
