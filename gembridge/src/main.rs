#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::io::Write;

use args::Args;
use clap::Parser;
use futures_util::StreamExt;
use gembridge_config::Config;
use gembridge_llm::types::{Message, StreamEvent};
use gembridge_llm::{ChatRequest, ChatStream, GeminiProvider, Provider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;
    gembridge_telemetry::init(&config.telemetry)?;

    let provider = GeminiProvider::new(&config.gemini)?;
    let model = args.model.unwrap_or_else(|| config.gemini.model.clone());

    tracing::info!(
        config_path = %args.config.display(),
        model = %model,
        "starting request"
    );

    let request = ChatRequest::new(model, args.system, vec![Message::user(args.prompt)]);
    let stream = provider.stream_chat(&request).await?;

    tokio::select! {
        result = print_events(stream) => result?,
        () = shutdown_signal() => tracing::info!("interrupted, closing stream"),
    }

    Ok(())
}

/// Write answer text to stdout and reasoning to stderr until the stream ends
async fn print_events(mut stream: ChatStream) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Text { text } => {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
            StreamEvent::Reasoning { text } => {
                write!(stderr, "\x1b[2m{text}\x1b[0m")?;
                stderr.flush()?;
            }
            StreamEvent::ToolCallPartial(delta) => {
                tracing::info!(index = delta.index, id = ?delta.id, name = ?delta.name, "tool call");
            }
            StreamEvent::Usage(usage) => {
                tracing::info!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    reasoning_tokens = ?usage.reasoning_tokens,
                    total_cost = ?usage.total_cost,
                    "usage"
                );
            }
            StreamEvent::Grounding { sources } => {
                for source in sources {
                    tracing::info!(title = %source.title, url = %source.url, "source");
                }
            }
            StreamEvent::ResponseMetadata(metadata) => {
                tracing::debug!(
                    response_id = ?metadata.response_id,
                    has_thought_signature = metadata.thought_signature.is_some(),
                    "response metadata"
                );
            }
        }
    }

    writeln!(stdout)?;
    Ok(())
}

/// Wait for `SIGINT`
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
