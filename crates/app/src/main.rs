mod config;

use anyhow::{Context, Result};
use clap::Parser;
use client::HttpBackend;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use ui::{Controller, Document, ExtractOutcome, Handled, MemoryDocument, SelectOption, render};

use config::AppConfig;

#[derive(Parser)]
#[command(name = "pii-shield")]
#[command(about = "Run text through the PII-Shield extraction page from the terminal", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Model identifier to select
    #[arg(long, short)]
    model: Option<String>,

    /// Text to analyze. Read from stdin when omitted.
    #[arg(long, short)]
    text: Option<String>,

    /// Print the model catalog and exit
    #[arg(long)]
    list_models: bool,

    /// Save the rendered page to this HTML file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn init_logging(json: bool) {
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Markup reduced to one line of text
fn plain(markup: &str) -> String {
    render::strip_tags(markup)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if cli.timeout_secs.is_some() {
        config.api.request_timeout_secs = cli.timeout_secs;
    }
    config.logging.json |= cli.log_json;

    init_logging(config.logging.json);

    let backend = match config.api.request_timeout_secs {
        Some(secs) => HttpBackend::with_timeout(config.api.base_url.clone(), Duration::from_secs(secs))?,
        None => HttpBackend::new(config.api.base_url.clone()),
    };
    info!(api = %backend.base_url(), "Using extraction backend");

    let ids = config.page.ids.clone();
    let document = Arc::new(MemoryDocument::standard_page(&ids));
    let controller = Arc::new(Controller::new(
        Arc::clone(&document),
        Arc::new(backend),
        ids.clone(),
    ));

    let wiring = controller.init().await;
    let mut options = document.options(&ids.model_selector).unwrap_or_default();

    if cli.list_models {
        if options.is_empty() {
            println!("No models available (is the backend running at {}?)", config.api.base_url);
        }
        for option in &options {
            println!("  {:<12} {}", option.value, option.text);
        }
        return Ok(());
    }

    if let Some(model) = cli.model {
        if !options.iter().any(|o| o.value == model) {
            warn!(%model, "Model is not in the catalog, sending it anyway");
            options.push(SelectOption {
                value: model.clone(),
                text: model.clone(),
            });
            document.replace_options(&ids.model_selector, options);
        }
        document.set_value(&ids.model_selector, &model);
    }

    let text = match cli.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read text from stdin")?;
            buf
        }
    };
    document.set_value(&ids.input, &text);

    if !wiring.extract {
        anyhow::bail!("Extract trigger '{}' is not on the page", ids.extract_button);
    }

    let handled = controller
        .spawn_click(&ids.extract_button)
        .context("Extract trigger did not accept the click")?
        .await?;

    if let Some(path) = &cli.output {
        let html = render::page(&*document, &ids, &config.page.title, &config.page.description);
        std::fs::write(path, html).context(format!("Failed to write page: {:?}", path))?;
        println!("✅ Page saved to {}", path.display());
    }

    let result = document.inner_html(&ids.result).unwrap_or_default();
    let snapshot = controller.metrics().snapshot();
    info!(metrics = %serde_json::to_string(&snapshot)?, "Session metrics");

    match handled {
        Handled::Extract(ExtractOutcome::Rendered) => {
            println!("\n📄 RESULT:\n{}", plain(&result));

            let badges = document.children(&ids.badges).unwrap_or_default();
            println!("\n🏷️  ENTITIES:");
            if badges.is_empty() {
                println!("  none");
            }
            for badge in &badges {
                println!("  {}", plain(badge));
            }
            Ok(())
        }
        Handled::Extract(ExtractOutcome::Skipped) => {
            anyhow::bail!("Page is missing a required element")
        }
        _ => anyhow::bail!(plain(&result)),
    }
}
