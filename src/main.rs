use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use auth_flow::account::{AccountService, SimulatedAccountService};
use auth_flow::config::FlowConfig;
use auth_flow::flow::{FlowRuntime, FlowSnapshot};
use auth_flow::intent::{Intent, IntentParser};

const HELP: &str = "\
Commands:
  go <welcome|signin|signup|forgot>   follow a link
  set <email|password|confirm|code> <value>
  focus <field> | blur
  submit | back | role <student|employee|donor|admin> | signout
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = FlowConfig::from_env()?;

    eprintln!("Auth Flow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Simulated latency: {:?}", config.simulated_latency);
    eprintln!("{HELP}\n");

    let service: Arc<dyn AccountService> =
        Arc::new(SimulatedAccountService::new(config.simulated_latency));
    let (handle, runtime) = FlowRuntime::spawn(service, &config);

    // ── Render every snapshot as one JSON line ──────────────────────────
    let mut snapshots = handle.subscribe();
    let renderer = tokio::spawn(async move {
        render(&snapshots.borrow_and_update());
        while snapshots.changed().await.is_ok() {
            render(&snapshots.borrow_and_update());
        }
    });

    // ── Forward stdin lines as intents ──────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(intent) = IntentParser::parse(&line) else {
            eprintln!("Unrecognised input.\n{HELP}");
            continue;
        };
        let quitting = intent == Intent::Shutdown;
        handle.send(intent).await?;
        if quitting {
            break;
        }
    }

    drop(handle);
    runtime.await?;
    renderer.abort();
    Ok(())
}

fn render(snapshot: &FlowSnapshot) {
    match serde_json::to_string(snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!("Failed to serialize snapshot: {}", e),
    }
}
