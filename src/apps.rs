use std::error::Error;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::{OutputPaths, PipelineConfig};
use crate::domain::{VOCABULARY_V1, VOCABULARY_V2};
use crate::keys::RepeatRuns;
use crate::pipeline::{Pipeline, RunSummary};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VocabularyArg {
    V1,
    V2,
}

#[derive(Debug, Parser)]
#[command(
    name = "analysis_corpus",
    version,
    disable_help_subcommand = true,
    about = "Flatten analysis records and precompute score statistics",
    long_about = "Scan a directory of per-domain JSON analysis records, export one schema-union TSV row per case, write score statistics and distribution documents, and report incomplete cases.",
    after_help = "Set RUST_LOG (for example RUST_LOG=info) to see per-run summaries and per-file warnings."
)]
struct AnalysisCorpusCli {
    #[arg(
        long = "input-dir",
        value_name = "DIR",
        default_value = crate::constants::corpus::DEFAULT_INPUT_DIR,
        help = "Directory holding <subject>_<case>_<domain>.json record files"
    )]
    input_dir: PathBuf,
    #[arg(
        long = "output-dir",
        value_name = "DIR",
        help = "Write every output under this directory instead of the default layout"
    )]
    output_dir: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Override the TSV export path")]
    export: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Override the statistics document path")]
    statistics: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Override the distribution document path")]
    distribution: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Override the completeness report path")]
    completeness: Option<PathBuf>,
    #[arg(
        long,
        value_enum,
        default_value = "v2",
        help = "Domain vocabulary (v1: first six domains, v2: all nine)"
    )]
    vocabulary: VocabularyArg,
    #[arg(
        long = "include-repeat-runs",
        help = "Export and aggregate repeat-run cases too"
    )]
    include_repeat_runs: bool,
    #[arg(
        long = "no-derived-aggregates",
        help = "Leave blank aggregate columns blank instead of deriving them"
    )]
    no_derived_aggregates: bool,
    #[arg(long = "follow-symlinks", help = "Follow symlinks in the input directory")]
    follow_symlinks: bool,
}

impl AnalysisCorpusCli {
    fn into_config(self) -> PipelineConfig {
        let mut outputs = match &self.output_dir {
            Some(dir) => OutputPaths::under(dir),
            None => OutputPaths::default(),
        };
        if let Some(path) = self.export {
            outputs.export = path;
        }
        if let Some(path) = self.statistics {
            outputs.statistics = path;
        }
        if let Some(path) = self.distribution {
            outputs.distribution = path;
        }
        if let Some(path) = self.completeness {
            outputs.completeness = path;
        }
        let vocabulary = match self.vocabulary {
            VocabularyArg::V1 => VOCABULARY_V1,
            VocabularyArg::V2 => VOCABULARY_V2,
        };
        let repeat_runs = if self.include_repeat_runs {
            RepeatRuns::Include
        } else {
            RepeatRuns::Exclude
        };
        PipelineConfig::new(self.input_dir)
            .with_outputs(outputs)
            .with_vocabulary(vocabulary)
            .with_repeat_runs(repeat_runs)
            .with_derived_aggregates(!self.no_derived_aggregates)
            .with_follow_symlinks(self.follow_symlinks)
    }
}

/// Parse CLI arguments (program name excluded) and run the full pipeline.
///
/// Returns `Ok(None)` when help or version output was requested.
pub fn run_pipeline<I>(args_iter: I) -> Result<Option<RunSummary>, Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<AnalysisCorpusCli, _>(
        std::iter::once("analysis_corpus".to_string()).chain(args_iter),
    )?
    else {
        return Ok(None);
    };

    let summary = Pipeline::new(cli.into_config()).run(Utc::now())?;
    println!(
        "Exported {} cases ({} columns); {} completeness issues, {} complete cases.",
        summary.exported_cases,
        summary.exported_columns,
        summary.completeness_issues,
        summary.complete_cases
    );
    Ok(Some(summary))
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
