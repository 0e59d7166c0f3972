use anyhow::Result;
use clap::Parser;
use quill_stream::{ChatStreamClient, StreamError};
use quill_types::{ChatRequest, RetrievalMode, GENERIC_FAILURE_MESSAGE};
use tracing_subscriber::EnvFilter;

/// Ask a question about your journal and watch the search unfold.
#[derive(Debug, Parser)]
#[command(name = "quill-ask", version)]
struct Args {
    /// The question to ask
    query: String,

    /// Base URL of a running quill-api server
    #[arg(long, env = "QUILL_URL", default_value = "http://127.0.0.1:8000")]
    url: String,

    /// Model provider (openai or anthropic)
    #[arg(long, env = "QUILL_PROVIDER", default_value = "anthropic")]
    provider: String,

    #[arg(long, env = "QUILL_MODEL", default_value = "claude-sonnet-4-5")]
    model: String,

    /// Entries to retrieve per similarity search
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    /// Retrieve once instead of running the agentic search loop
    #[arg(long)]
    single_shot: bool,

    /// Continue an existing thread
    #[arg(long)]
    thread: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut request = ChatRequest::new(&args.query, &args.provider, &args.model).with_top_k(args.top_k);
    if args.single_shot {
        request = request.with_mode(RetrievalMode::SingleShot);
    }
    if let Some(thread) = &args.thread {
        request = request.with_thread(thread);
    }

    let client = ChatStreamClient::new(&args.url);

    println!("Searching your journal...\n");
    let result = client
        .stream_chat(
            &request,
            |iteration| {
                println!(
                    "  [{}] {} ({} results, {} new) - {}",
                    iteration.iteration,
                    iteration.tool,
                    iteration.results_count,
                    iteration.new_entries_added,
                    iteration.reasoning,
                );
            },
            |_| println!(),
        )
        .await;

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Chat stream failed");
            eprintln!("{}", failure_text(&e));
            std::process::exit(1);
        }
    };

    println!("{}\n", response.response);

    if !response.docs.is_empty() {
        println!("Entries used:");
        for doc in &response.docs {
            println!("  - {} ({})", doc.entry.title, doc.entry.date);
        }
    }

    Ok(())
}

/// What the user sees when a turn fails. The error detail goes to the log.
fn failure_text(_err: &StreamError) -> &'static str {
    GENERIC_FAILURE_MESSAGE
}
