use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::{info, warn};

use herald::Config;
use herald_common::Signal;
use herald_delivery::{CampaignRunner, HttpDeliveryClient, RunConfig, RunOutcome};
use herald_provider::ProviderServer;
use herald_roster::{Roster, ingest};

#[derive(Debug, Parser)]
#[command(name = "herald", version, about = "Bulk campaign delivery with SMS failover")]
struct Cli {
    /// Path to the configuration file (defaults to ./herald.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a campaign over a CSV contact list
    Run {
        /// The contact list to send to
        #[arg(long)]
        csv: PathBuf,

        /// Email template to send with (overrides the config file)
        #[arg(long)]
        email_template: Option<String>,

        /// SMS template for failover (overrides the config file)
        #[arg(long)]
        sms_template: Option<String>,

        /// Enable SMS failover on bounce
        #[arg(long)]
        sms_failover: bool,
    },

    /// Serve the bundled mock delivery provider
    MockProvider {
        /// Listen address (overrides the config file)
        #[arg(long)]
        listen: Option<String>,
    },

    /// List the provider's template catalogs
    Templates,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    herald_common::logging::init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Run {
            csv,
            email_template,
            sms_template,
            sms_failover,
        } => run_campaign(config, &csv, email_template, sms_template, sms_failover).await,
        Command::MockProvider { listen } => serve_mock(config, listen).await,
        Command::Templates => list_templates(&config).await,
    }
}

fn delivery_client(config: &Config) -> anyhow::Result<HttpDeliveryClient> {
    HttpDeliveryClient::new(
        config.provider.base_url.as_str(),
        &config.provider.api_key,
        config.provider.request_timeout_secs.map(Duration::from_secs),
    )
    .context("building the delivery client")
}

async fn run_campaign(
    config: Config,
    csv: &std::path::Path,
    email_template: Option<String>,
    sms_template: Option<String>,
    sms_failover: bool,
) -> anyhow::Result<()> {
    let ingested = ingest::ingest_path(csv)
        .with_context(|| format!("ingesting contact list {}", csv.display()))?;
    if ingested.rows.is_empty() {
        warn!("Contact list is empty; the run will be a no-op");
    }

    let email_template = email_template
        .or(config.run.email_template.clone())
        .context("an email template is required (--email-template or [run] email_template)")?;

    let mut run_config = RunConfig::new(email_template)
        .with_pacing(Duration::from_millis(config.run.pacing_ms));
    run_config.sms_template_id = sms_template.or(config.run.sms_template.clone());
    run_config.enable_sms_failover = sms_failover || config.run.enable_sms_failover;

    let client = delivery_client(&config)?;
    let roster = Roster::from_rows(ingested.headers, ingested.rows);
    let runner = Arc::new(CampaignRunner::new(roster, Arc::new(client)));

    {
        let runner = Arc::clone(&runner);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received; stopping after the in-flight row");
                runner.stop();
            }
        });
    }

    let mut progress = runner.progress();
    let progress_task = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let current = *progress.borrow_and_update();
            if current.running {
                info!(
                    "Progress: {}/{} ({:.0}%)",
                    current.current_index, current.total, current.percent
                );
            }
        }
    });

    let report = runner.run(&run_config).await?;
    progress_task.abort();

    for row in runner.roster().snapshot() {
        if let Some(error) = &row.error {
            println!("{}  {}  {error}", row.id, row.email_status);
        }
    }
    println!("{}", report.summary);

    match report.outcome {
        RunOutcome::Completed => info!("Campaign completed"),
        RunOutcome::Stopped => info!(
            "Campaign stopped by operator after {} rows",
            report.processed
        ),
    }

    Ok(())
}

async fn serve_mock(config: Config, listen: Option<String>) -> anyhow::Result<()> {
    let mut provider_config = config.mock;
    if let Some(listen) = listen {
        provider_config.listen_address = listen;
    }

    let server = ProviderServer::new(provider_config)
        .await
        .context("starting the mock provider")?;
    info!("Mock provider listening on {}", server.local_addr()?);

    let (shutdown, receiver) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown.send(Signal::Shutdown);
        }
    });

    server.serve(receiver).await.context("mock provider server")
}

async fn list_templates(config: &Config) -> anyhow::Result<()> {
    let client = delivery_client(config)?;

    let emails = client
        .email_templates()
        .await
        .context("fetching email templates")?;
    println!("Email templates:");
    for template in emails {
        println!("  {}  {}  ({})", template.id, template.name, template.subject);
    }

    let sms = client
        .sms_templates()
        .await
        .context("fetching SMS templates")?;
    println!("SMS templates:");
    for template in sms {
        println!("  {}  {}", template.id, template.name);
    }

    Ok(())
}
