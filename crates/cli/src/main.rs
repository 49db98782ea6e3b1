//! Workload Console CLI
//!
//! A command-line presenter for the workload console: lists workloads and
//! applications per namespace and scales resources or whole applications.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{ArgGroup, Args, Parser, Subcommand};
use commands::{apps, scale, workloads};

/// Workload Console CLI
#[derive(Parser)]
#[command(name = "wlc")]
#[command(author, version, about = "CLI for the Workload Console", long_about = None)]
pub struct Cli {
    /// Console API URL (can also be set via WLC_API_URL env var)
    #[arg(long, env = "WLC_API_URL")]
    pub api_url: Option<String>,

    /// Namespace to operate on (falls back to the config file, then "default")
    #[arg(long, short, global = true, env = "WLC_NAMESPACE")]
    pub namespace: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List workloads grouped into applications
    Apps {
        /// Also list each application's workloads
        #[arg(long)]
        wide: bool,
    },

    /// List resources
    #[command(subcommand)]
    Get(GetCommands),

    /// Scale a single workload or every workload of an application
    Scale(ScaleArgs),

    /// Show console and cluster health
    Health,
}

#[derive(Subcommand)]
pub enum GetCommands {
    /// List deployments
    Deployments,
    /// List stateful sets
    Statefulsets,
    /// List pods
    Pods,
    /// List namespaces
    Namespaces,
}

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["app", "name"])))]
pub struct ScaleArgs {
    /// Desired replica count
    #[arg(long, short)]
    pub replicas: u32,

    /// Application id to scale (all of its Deployments and StatefulSets)
    #[arg(long, conflicts_with_all = ["name", "kind"])]
    pub app: Option<String>,

    /// Name of a single workload to scale
    #[arg(long, requires = "kind")]
    pub name: Option<String>,

    /// Kind of the single workload (deployment or statefulset)
    #[arg(long, requires = "name")]
    pub kind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file_config = config::Config::load()?;

    let api_url = file_config.resolve_api_url(cli.api_url.as_deref());
    let namespace = file_config.resolve_namespace(cli.namespace.as_deref());
    let format = cli.format.unwrap_or_else(|| file_config.resolve_format());

    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Apps { wide } => {
            apps::list_apps(&client, &namespace, wide, format).await?;
        }
        Commands::Get(get_cmd) => match get_cmd {
            GetCommands::Deployments => {
                workloads::list_workloads(&client, "deployments", &namespace, format).await?;
            }
            GetCommands::Statefulsets => {
                workloads::list_workloads(&client, "statefulsets", &namespace, format).await?;
            }
            GetCommands::Pods => {
                workloads::list_pods(&client, &namespace, format).await?;
            }
            GetCommands::Namespaces => {
                workloads::list_namespaces(&client, format).await?;
            }
        },
        Commands::Scale(args) => {
            scale::scale(&client, &namespace, args, format).await?;
        }
        Commands::Health => {
            apps::show_health(&client, format).await?;
        }
    }

    Ok(())
}
