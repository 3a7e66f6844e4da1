use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use scholarscout_lib::cli::{Cli, Commands, ServerArgs};
use scholarscout_lib::config::{self, ServiceSettings};
use scholarscout_lib::diagnostic::{render_response, run_health_check, HealthProbe, ProbeResult};
use scholarscout_lib::mcp::{McpClient, McpError, ToolProvider};
use scholarscout_lib::pipeline::batch::{list_corpus, BatchRunner, BatchStatusEvent, CancelFlag};
use scholarscout_lib::pipeline::extraction::DocumentTextSource;
use scholarscout_lib::pipeline::graph::{
    DiscoveryStage, EnrichmentStage, GraphError, McpContactLookup, PipelineGraph, PipelineState,
    SaveStage, StageEvent,
};
use scholarscout_lib::pipeline::storage::{save, summarize};
use scholarscout_lib::pipeline::structuring::{OpenAiClient, RecordExtractor};
use scholarscout_lib::pipeline_config::PipelineConfig;
use scholarscout_lib::report;

fn main() -> Result<()> {
    scholarscout_lib::init_tracing();
    let cli = Cli::parse();
    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);

    match cli.command {
        Commands::Extract {
            corpus,
            output,
            pages,
            max_chars,
            pacing_ms,
            model,
        } => {
            let pipeline_config = PipelineConfig::default()
                .with_page_budget(pages)
                .with_max_context_chars(max_chars)
                .with_pacing_delay(Duration::from_millis(pacing_ms));
            run_extract(corpus, output, pipeline_config, model)
        }
        Commands::Scout {
            topic,
            output,
            max_candidates,
            lookup_delay_ms,
            trace_stages,
            server,
        } => runtime()?.block_on(run_scout(
            topic,
            output,
            max_candidates,
            Duration::from_millis(lookup_delay_ms),
            trace_stages,
            server,
        )),
        Commands::CheckServer { author, server } => {
            runtime()?.block_on(run_check_server(HealthProbe::author_search(&author), server))
        }
        Commands::TestSearch { topic, server } => {
            runtime()?.block_on(run_test_search(topic, server))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Ctrl-C sets the flag; the run stops at the next document, stage or candidate.
fn install_ctrlc(cancel: &CancelFlag) -> Result<()> {
    let cancel = cancel.clone();
    let handler = async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current item");
            cancel.cancel();
        }
    };
    std::thread::Builder::new()
        .name("ctrlc".into())
        .spawn(move || {
            if let Ok(rt) = runtime() {
                rt.block_on(handler);
            }
        })
        .context("Failed to install interrupt handler")?;
    Ok(())
}

fn run_extract(
    corpus: PathBuf,
    output: PathBuf,
    pipeline_config: PipelineConfig,
    model: Option<String>,
) -> Result<()> {
    let settings = ServiceSettings::from_env()?;
    let model = model.unwrap_or_else(|| settings.model.clone());
    let documents = list_corpus(&corpus)?;
    tracing::info!(
        corpus = %corpus.display(),
        documents = documents.len(),
        model = %model,
        "Starting extraction"
    );

    let client = OpenAiClient::from_settings(&settings)?;
    let extractor = RecordExtractor::new(Box::new(client), &model, pipeline_config.clone());
    let cancel = CancelFlag::new();
    install_ctrlc(&cancel)?;

    let columns: Vec<String> = pipeline_config.canonical_fields.clone();
    let runner = BatchRunner::new(
        Box::new(DocumentTextSource::default()),
        Box::new(extractor),
        pipeline_config,
    )
    .with_cancel_flag(cancel);

    let progress = |event: BatchStatusEvent| {
        if let BatchStatusEvent::Progress {
            completed,
            total,
            current_document,
        } = event
        {
            eprintln!("[{}/{}] {}", completed + 1, total, current_document);
        }
    };
    let outcome = runner.process(&documents, Some(&progress));

    let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    let rows_written = save(&outcome.records, &column_refs, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    let summary = summarize(&outcome.records);

    println!(
        "{}",
        report::render_extraction_report(&outcome, &summary, &output, rows_written)
    );
    Ok(())
}

async fn connect(server: &ServerArgs) -> Result<Arc<McpClient>> {
    let config = server.to_config();
    let client = McpClient::new(config.clone());
    client.connect().await.map_err(|e| match e {
        McpError::ExecutableNotFound { ref command } if command == "uv" => anyhow::anyhow!(
            "{e}\nInstall uv (https://docs.astral.sh/uv/) or pass --server-command"
        ),
        other => anyhow::Error::new(other).context(format!(
            "Could not start search server `{} {}`",
            config.command,
            config.args.join(" ")
        )),
    })?;
    Ok(Arc::new(client))
}

async fn run_scout(
    topic: String,
    output: PathBuf,
    max_candidates: Option<usize>,
    lookup_delay: Duration,
    trace_stages: bool,
    server: ServerArgs,
) -> Result<()> {
    let client = connect(&server).await?;
    let provider: Arc<dyn ToolProvider> = client.clone();
    let cancel = CancelFlag::new();
    install_ctrlc(&cancel)?;

    let graph = PipelineGraph::new(
        DiscoveryStage::new(provider.clone()).with_max_candidates(max_candidates),
        EnrichmentStage::new(Arc::new(McpContactLookup::new(provider)))
            .with_pacing_delay(lookup_delay)
            .with_cancel_flag(cancel.clone()),
        SaveStage::new(&output),
    )
    .with_cancel_flag(cancel);

    let print_stage = |event: &StageEvent| {
        match serde_json::to_string_pretty(event) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "Could not render stage event"),
        }
    };
    let observer: Option<&(dyn Fn(&StageEvent) + Sync)> = if trace_stages {
        Some(&print_stage)
    } else {
        None
    };

    let result = graph.run(PipelineState::new(topic), observer).await;
    if let Err(e) = client.disconnect().await {
        tracing::warn!(error = %e, "Search server did not shut down cleanly");
    }

    let state = match result {
        Ok(state) => state,
        Err(GraphError::Cancelled { stage, state }) => {
            println!("Cancelled before the {stage} stage");
            let mut state = *state;
            SaveStage::new(&output)
                .write_partial(&mut state)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            state
        }
        Err(e) => return Err(e.into()),
    };
    println!("{}", report::render_scout_report(&state));
    Ok(())
}

async fn run_check_server(probe: HealthProbe, server: ServerArgs) -> Result<()> {
    println!("Starting search server...");
    let client = connect(&server).await?;
    println!("Connected.");

    let report = run_health_check(&*client, &probe).await;
    if let Err(e) = client.disconnect().await {
        tracing::warn!(error = %e, "Search server did not shut down cleanly");
    }

    let report = report?;
    println!("{report}");
    if report.is_healthy() {
        println!("\nServer is working.");
    } else {
        println!("\nServer started, but the sample call failed. Check the server logs.");
    }
    Ok(())
}

async fn run_test_search(topic: String, server: ServerArgs) -> Result<()> {
    let client = connect(&server).await?;
    let report = run_health_check(&*client, &HealthProbe::topic_search(&topic)).await;
    if let Err(e) = client.disconnect().await {
        tracing::warn!(error = %e, "Search server did not shut down cleanly");
    }

    let report = report?;
    println!("Calling {} for {:?}", report.probe_tool, topic);
    match &report.probe {
        ProbeResult::Success { response } => {
            println!("{}", render_response(response));
        }
        ProbeResult::Failed { error } => {
            anyhow::bail!("Search failed: {error}");
        }
    }
    Ok(())
}
