//! `deedkit` command-line client.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deedkit::{
    default_key_path, write_identity, ClientConfig, DeedClient, Identity, WaitOutcome, WaitReport,
};

#[derive(Parser)]
#[command(name = "deedkit")]
#[command(about = "Submit and inspect deeds on a ledger", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger REST URL.
    #[arg(long, global = true)]
    url: Option<String>,

    /// Private key file.
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    /// Basic-auth user name.
    #[arg(long, global = true)]
    username: Option<String>,

    /// Basic-auth password.
    #[arg(long, global = true, env = "DEEDKIT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Seconds to wait for the batch to commit.
    #[arg(long, global = true)]
    wait: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new deed
    Create { name: String, owner: String },
    /// Transfer a deed to a new owner
    Transfer { name: String, new_owner: String },
    /// Delete a deed
    Delete { name: String },
    /// List every deed
    List,
    /// Show one deed
    Show { name: String },
    /// Print the state address of a deed
    Address { name: String },
    /// Generate a key pair
    Keygen {
        /// Key name; defaults to $USER.
        name: Option<String>,
        /// Write to this path instead of ~/.deedkit/keys/<name>.priv.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Cli {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        }
        .with_env_overrides()
        .with_url_override(self.url.clone());

        if let Some(key_file) = &self.key_file {
            config.key_file = Some(key_file.clone());
        }
        if self.username.is_some() {
            config.username = self.username.clone();
        }
        if self.password.is_some() {
            config.password = self.password.clone();
        }
        if self.wait.is_some() {
            config.wait_secs = self.wait;
        }
        if config.key_file.is_none() {
            config.key_file = default_key_path(None).filter(|path| path.exists());
        }
        Ok(config)
    }

    fn connect(&self) -> anyhow::Result<(DeedClient, Option<Duration>)> {
        let config = self.client_config()?;
        let client = DeedClient::from_config(&config)
            .with_context(|| format!("failed to set up client for {}", config.url))?;
        Ok((client, config.wait()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "deedkit=info,deedkit_gateway=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Create { name, owner } => {
            let (client, wait) = cli.connect()?;
            print_report(&client.create(name, owner, wait).await?);
        }
        Commands::Transfer { name, new_owner } => {
            let (client, wait) = cli.connect()?;
            print_report(&client.transfer(name, new_owner, wait).await?);
        }
        Commands::Delete { name } => {
            let (client, wait) = cli.connect()?;
            print_report(&client.delete(name, wait).await?);
        }
        Commands::List => {
            let (client, _) = cli.connect()?;
            let deeds = client.list().await?;
            if deeds.is_empty() {
                println!("no deeds");
            }
            for deed in deeds {
                println!("{:<32} {}", deed.name, deed.owner);
            }
        }
        Commands::Show { name } => {
            let (client, _) = cli.connect()?;
            let deed = client.show(name).await?;
            println!("NAME:  {}", deed.name);
            println!("OWNER: {}", deed.owner);
        }
        Commands::Address { name } => {
            println!("{}", deedkit::address_for(name));
        }
        Commands::Keygen { name, out } => {
            let path = out
                .clone()
                .or_else(|| default_key_path(name.as_deref()))
                .context("cannot determine home directory")?;
            let identity = Identity::generate();
            let public_path = write_identity(&path, &identity)?;
            println!("writing file: {}", path.display());
            println!("writing file: {}", public_path.display());
        }
    }

    Ok(())
}

fn print_report(report: &WaitReport) {
    println!("Response: {}", report.receipt.acknowledgement);
    match report.outcome {
        WaitOutcome::NotWaited => {}
        WaitOutcome::Settled(status) => println!("Status: {}", status),
        WaitOutcome::TimedOut => println!("Status: still pending after {:?}", report.elapsed),
    }
}
