use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use cdp_adapter::{open_page, CdpTransport, ChromiumTransport};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pagetag::metrics::{register_metrics, render};
use pagetag::telemetry::init_logging;
use pagetag::{PageDetails, PageSession, PagetagConfig, Tag, TagMap};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct CliArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (overrides the configured one)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,

    /// Output format
    #[arg(short, long, default_value = "human")]
    output: OutputFormat,

    /// Attach to an existing Chrome DevTools websocket
    #[arg(long)]
    ws_url: Option<String>,

    /// Run Chrome with a visible window instead of headless mode
    #[arg(long)]
    headful: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a page, tag its visible interactive elements and print the tags
    Inspect(InspectArgs),

    /// Open a page and print its url, title and geometry
    Details(DetailsArgs),
}

#[derive(Args, Clone, Debug)]
struct InspectArgs {
    /// URL to open
    url: String,

    /// Write the annotated screenshot here (PNG)
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Time to let the page render after navigation, in milliseconds
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,
}

#[derive(Args, Clone, Debug)]
struct DetailsArgs {
    /// URL to open
    url: String,

    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,

    /// Also print the CDP command counters in prometheus text format
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();

    let mut config = PagetagConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ws_url) = &cli.ws_url {
        config.cdp.websocket_url = Some(ws_url.clone());
    }
    if cli.headful {
        config.cdp.headless = false;
    }
    let _log_guard = init_logging(&config.logging, cli.debug)?;
    register_metrics();

    info!("Starting pagetag v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli, &config).await {
        Ok(()) => Ok(()),
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}

async fn run(cli: &CliArgs, config: &PagetagConfig) -> Result<()> {
    let transport = Arc::new(ChromiumTransport::new(config.cdp.clone()));
    let result = run_command(cli, config, transport.clone()).await;
    transport.shutdown().await;
    result
}

async fn run_command(
    cli: &CliArgs,
    config: &PagetagConfig,
    transport: Arc<ChromiumTransport>,
) -> Result<()> {
    match &cli.command {
        Commands::Inspect(args) => {
            let session = open_session(transport, config, &args.url, args.settle_ms).await?;
            let tags = session.tagify().await.context("Tagging failed")?;
            print_tags(&tags, &cli.output)?;

            if let Some(path) = &args.screenshot {
                let shot = session.take_screenshot().await.context("Screenshot failed")?;
                if let Some(flag) = &shot.error {
                    info!(flag = %flag, "screenshot unavailable; writing placeholder");
                }
                let png = BASE64
                    .decode(&shot.b64_image)
                    .context("Screenshot is not valid base64")?;
                tokio::fs::write(path, png)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), "annotated screenshot written");
            }
        }
        Commands::Details(args) => {
            let session = open_session(transport, config, &args.url, args.settle_ms).await?;
            let details = session.page_details().await.context("Page details failed")?;
            print_details(&details, &cli.output)?;
            if args.metrics {
                print!("{}", render()?);
            }
        }
    }
    Ok(())
}

async fn open_session(
    transport: Arc<ChromiumTransport>,
    config: &PagetagConfig,
    url: &str,
    settle_ms: u64,
) -> Result<PageSession> {
    let page = open_page(transport, "about:blank")
        .await
        .context("Failed to open a browser page")?;
    info!(target_id = %page.target_id, "page attached");

    let session = PageSession::with_config(Arc::new(page.channel), config);
    session.init().await.context("Failed to initialise page")?;
    let report = session.goto(url).await.context("Navigation failed")?;
    if report.timed_out {
        info!(url, "navigation still loading; continuing");
    }
    tokio::time::sleep(Duration::from_millis(settle_ms)).await;
    Ok(session)
}

fn print_tags(tags: &TagMap, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tags)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(tags)?),
        OutputFormat::Human => {
            println!("{} tagged element(s)", tags.len());
            for (key, tag) in tags.iter() {
                println!("[{key}] {}", describe(tag));
            }
        }
    }
    Ok(())
}

fn describe(tag: &Tag) -> String {
    let base = tag.base();
    let mut line = format!("{} {:?}", base.tag_name, base.inner_text);
    match tag {
        Tag::Anchor(anchor) => {
            if let Some(role) = &anchor.role {
                line.push_str(&format!(" role={role}"));
            }
        }
        Tag::Input(input) => {
            if let Some(kind) = &input.input_type {
                line.push_str(&format!(" type={kind}"));
            }
            if let Some(value) = &input.value {
                line.push_str(&format!(" value={value:?}"));
            }
        }
        Tag::Select(select) => line.push_str(&format!(" options={:?}", select.options)),
        Tag::Base(_) => {}
    }
    let scroll: Vec<&str> = [
        (base.can_scroll_up, "up"),
        (base.can_scroll_down, "down"),
        (base.can_scroll_left, "left"),
        (base.can_scroll_right, "right"),
    ]
    .into_iter()
    .filter_map(|(flag, name)| flag.then_some(name))
    .collect();
    if !scroll.is_empty() {
        line.push_str(&format!(" scroll={}", scroll.join(",")));
    }
    line
}

fn print_details(details: &PageDetails, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(details)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(details)?),
        OutputFormat::Human => {
            println!("URL:        {}", details.url);
            println!("Title:      {}", details.title);
            match details.viewport {
                Some(viewport) => println!("Viewport:   {}x{}", viewport.width, viewport.height),
                None => println!("Viewport:   unknown"),
            }
            let dims = details.dimensions;
            println!("Page size:  {}x{}", dims.width, dims.height);
            println!("Scroll:     ({}, {})", dims.scroll_x, dims.scroll_y);
        }
    }
    Ok(())
}
