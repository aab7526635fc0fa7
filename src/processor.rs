//! Pipeline orchestration across datasets.
//!
//! Discovers the survey extracts, fans the year/partition datasets out to a
//! bounded pool of blocking workers, and hands the results to a
//! [`RecordSink`] in `(year, partition)` order once every worker is done.
//! Datasets share no mutable state; only the finished results are merged.

use crate::app::services::crosswalk::RuleCatalog;
use crate::app::services::record_processor::{ProcessingResult, ProcessingStats, RecordProcessor};
use crate::config::OewsConfig;
use crate::error::{OewsError, Result};
use crate::metric_catalog::MetricCatalog;
use crate::models::SourceDataset;
use crate::sink::RecordSink;
use crate::source::{SourceFile, discover_sources, read_dataset};

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info};

/// Outcome of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub datasets_processed: usize,
    /// Datasets excluded by the configured year floors
    pub datasets_skipped: usize,
    pub records_written: usize,
    pub series_written: usize,
    pub stats: ProcessingStats,
    pub processing_time_ms: u128,
}

/// Main processor for OEWS extract conversion
pub struct PipelineProcessor {
    input_path: PathBuf,
    config: OewsConfig,
    record_processor: Arc<RecordProcessor>,
}

impl PipelineProcessor {
    /// Create a processor, loading the rule and metric catalogs named by
    /// `config` (or the bundled ones)
    pub fn new(input_path: PathBuf, config: OewsConfig) -> Result<Self> {
        let rules = match &config.rules_path {
            Some(path) => RuleCatalog::load(path)?,
            None => RuleCatalog::builtin()?,
        };
        let metrics = match &config.metrics_path {
            Some(path) => MetricCatalog::load(path)?,
            None => MetricCatalog::default(),
        };
        Self::with_catalogs(input_path, config, rules, metrics)
    }

    pub fn with_catalogs(
        input_path: PathBuf,
        config: OewsConfig,
        rules: RuleCatalog,
        metrics: MetricCatalog,
    ) -> Result<Self> {
        config.validate()?;
        let selected = metrics.select(&config.metric_types)?;

        let rule_count = rules.rule_count();
        let engine = rules.into_engine();
        info!(
            "Pipeline ready: {} degrouping and {} revision groups ({} rules), metric types [{}]",
            engine.degrouping_groups().len(),
            engine.revision_groups().len(),
            rule_count,
            config.metric_types.join(", ")
        );

        let record_processor = Arc::new(RecordProcessor::new(Arc::new(engine), selected));

        Ok(Self {
            input_path,
            config,
            record_processor,
        })
    }

    pub fn config(&self) -> &OewsConfig {
        &self.config
    }

    /// Discover, process and write every extract under the input path
    pub async fn process<S: RecordSink>(&self, sink: &mut S) -> Result<RunSummary> {
        let start_time = Instant::now();
        if self.config.show_progress {
            println!("{}", "Starting OEWS processing".bright_green().bold());
            println!(
                "  {} {}",
                "Input:".bright_cyan(),
                self.input_path.display()
            );
        }

        let discovered = discover_sources(&self.input_path)?;
        let discovered_count = discovered.len();
        let sources: Vec<SourceFile> = discovered
            .into_iter()
            .filter(|source| {
                let included = self.config.includes(&source.key);
                if !included {
                    debug!("Skipping {}: below configured year floor", source.key);
                }
                included
            })
            .collect();
        let skipped = discovered_count - sources.len();

        if self.config.show_progress {
            println!(
                "  {} {} extracts ({} below year floors)",
                "Found".bright_green(),
                sources.len().to_string().bright_white().bold(),
                skipped
            );
        }

        let processor = Arc::clone(&self.record_processor);
        let results = self
            .run_workers(sources, move |source| {
                let dataset = read_dataset(&source)?;
                processor.process_dataset(&dataset)
            })
            .await?;

        let mut summary = write_results(results, sink)?;
        summary.datasets_skipped = skipped;
        summary.processing_time_ms = start_time.elapsed().as_millis();

        if self.config.show_progress {
            print_summary(&summary);
        }
        Ok(summary)
    }

    /// Process datasets already held in memory
    pub async fn process_datasets<S: RecordSink>(
        &self,
        datasets: Vec<SourceDataset>,
        sink: &mut S,
    ) -> Result<RunSummary> {
        let start_time = Instant::now();
        let total = datasets.len();
        let datasets: Vec<SourceDataset> = datasets
            .into_iter()
            .filter(|dataset| self.config.includes(&dataset.key))
            .collect();
        let skipped = total - datasets.len();

        let processor = Arc::clone(&self.record_processor);
        let results = self
            .run_workers(datasets, move |dataset| processor.process_dataset(&dataset))
            .await?;

        let mut summary = write_results(results, sink)?;
        summary.datasets_skipped = skipped;
        summary.processing_time_ms = start_time.elapsed().as_millis();
        Ok(summary)
    }

    /// Run `work` on blocking workers with at most `workers` in flight
    async fn run_workers<T, F>(&self, items: Vec<T>, work: F) -> Result<Vec<ProcessingResult>>
    where
        T: Send + 'static,
        F: Fn(T) -> Result<ProcessingResult> + Send + Sync + 'static,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let pb = self.progress_bar(items.len() as u64);
        let concurrent_limit = self.config.workers.min(items.len()).max(1);
        debug!("Processing {} datasets with {} workers", items.len(), concurrent_limit);

        let work = Arc::new(work);
        let results: Vec<Result<ProcessingResult>> = stream::iter(items)
            .map(|item| {
                let work = Arc::clone(&work);
                let pb = pb.clone();
                async move {
                    let outcome = task::spawn_blocking(move || work(item))
                        .await
                        .map_err(OewsError::from)
                        .and_then(|result| result);
                    if let Ok(result) = &outcome {
                        pb.set_message(format!("Processed {}", result.key));
                    }
                    pb.inc(1);
                    outcome
                }
            })
            .buffer_unordered(concurrent_limit)
            .collect()
            .await;

        pb.finish_with_message("All datasets processed");

        let mut results = results.into_iter().collect::<Result<Vec<_>>>()?;
        results.sort_by_key(|result| result.key);
        Ok(results)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message("Processing datasets");
        pb
    }
}

/// Hand results to the sink in `(year, partition)` order
fn write_results<S: RecordSink>(
    results: Vec<ProcessingResult>,
    sink: &mut S,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for result in &results {
        sink.write_series(&result.series)?;
        sink.write_records(&result.records)?;
        summary.series_written += result.series.len();
        summary.stats.merge(&result.stats);
        summary.datasets_processed += 1;
        debug!("{} ({} records)", result.summary(), result.record_count());
    }

    summary.records_written = sink.finish()?;
    info!(
        "Run complete: {} datasets, {}",
        summary.datasets_processed,
        summary.stats.summary()
    );
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        summary.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Datasets processed:".bright_cyan(),
        summary.datasets_processed.to_string().bright_white()
    );
    if summary.datasets_skipped > 0 {
        println!(
            "  {} {}",
            "Datasets skipped:".bright_yellow(),
            summary.datasets_skipped.to_string().bright_yellow()
        );
    }
    println!(
        "  {} {}",
        "Rows read:".bright_cyan(),
        summary.stats.total_input.to_string().bright_white()
    );
    let dropped = summary.stats.dropped_total();
    if dropped > 0 {
        println!(
            "  {} {}",
            "Rows dropped:".bright_red(),
            dropped.to_string().bright_red().bold()
        );
        for (kind, count) in &summary.stats.dropped {
            println!("    {} {}", format!("{}:", kind).bright_red(), count);
        }
    }
    println!(
        "  {} {} ({} replaced)",
        "Aggregates computed:".bright_cyan(),
        summary.stats.aggregates_computed().to_string().bright_white(),
        summary.stats.aggregates_replaced
    );
    println!(
        "  {} {}",
        "Records written:".bright_cyan(),
        summary.records_written.to_string().bright_white().bold()
    );
}
