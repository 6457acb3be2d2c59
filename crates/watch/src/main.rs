//! newsinsight-watch: submit a job and follow it to a terminal status.
//!
//! Usage:
//!   newsinsight-watch search <query...>
//!   newsinsight-watch deep-analysis <query...>
//!   newsinsight-watch training <model> <dataset> <epochs>
//!
//! The job service base URL comes from `NEWSINSIGHT_API_URL`
//! (default `http://localhost:3000`).

use std::collections::HashMap;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsinsight_client::JobsApi;
use newsinsight_core::request::{DeepAnalysisParams, JobRequest, SearchParams, TrainingParams};
use newsinsight_core::JobStatus;
use newsinsight_monitor::{JobMonitor, MonitorConfig, MonitorEventKind};
use newsinsight_stream::EventStreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsinsight_watch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let request = parse_args().context(
        "usage: newsinsight-watch <search|deep-analysis|training> <args...>",
    )?;

    let base_url = std::env::var("NEWSINSIGHT_API_URL")
        .unwrap_or_else(|_| "http://localhost:3000".into());

    // One pooled HTTP client shared by the REST and stream paths.
    let http = reqwest::Client::new();
    let api = JobsApi::with_client(http.clone(), base_url.clone());
    let stream = EventStreamClient::with_client(http, base_url);
    let monitor = JobMonitor::new(api, stream, MonitorConfig::from_env());

    let mut events = monitor.subscribe();
    let started = monitor.submit_and_track(&request).await?;
    tracing::info!(job_id = %started.job_id, status = %started.status, "Job submitted");

    let final_record = loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Lagged behind monitor events");
                continue;
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                bail!("monitor event channel closed unexpectedly");
            }
        };

        if let MonitorEventKind::JobUpdated { record } = event.kind {
            if record.id != started.job_id {
                continue;
            }
            println!(
                "[{:>5.1}%] {} {}",
                record.progress,
                record.status,
                summarize_metrics(&record.metrics),
            );
            if record.status.is_terminal() {
                break record;
            }
        }
    };

    monitor.shutdown().await;

    match final_record.status {
        JobStatus::Completed => {
            if let Some(result) = &final_record.result {
                println!("{}", serde_json::to_string_pretty(result)?);
            }
            Ok(())
        }
        status => bail!(
            "job {} ended with status {status}: {}",
            final_record.id,
            final_record.error_message.as_deref().unwrap_or("no details"),
        ),
    }
}

/// Build a job request from the command line.
fn parse_args() -> anyhow::Result<JobRequest> {
    let mut args = std::env::args().skip(1);
    let kind = args.next().context("missing job kind")?;

    match kind.as_str() {
        "search" => Ok(JobRequest::Search(SearchParams {
            query: args.collect::<Vec<_>>().join(" "),
            max_results: None,
            source_ids: Vec::new(),
        })),
        "deep-analysis" => Ok(JobRequest::DeepAnalysis(DeepAnalysisParams {
            query: args.collect::<Vec<_>>().join(" "),
            depth: None,
            focus_areas: Vec::new(),
        })),
        "training" => {
            let model_name = args.next().context("missing model name")?;
            let dataset_id = args.next().context("missing dataset id")?;
            let epochs = args
                .next()
                .context("missing epoch count")?
                .parse()
                .context("epochs must be a positive integer")?;
            Ok(JobRequest::Training(TrainingParams {
                model_name,
                dataset_id,
                epochs,
            }))
        }
        other => bail!("unknown job kind: {other}"),
    }
}

/// Render metrics as `key=value` pairs in stable order.
fn summarize_metrics(metrics: &HashMap<String, f64>) -> String {
    let mut pairs: Vec<_> = metrics.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
