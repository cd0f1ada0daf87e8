use clap::Parser;
use clap::Subcommand;
use homeinspect_cli::BackendArgs;
use homeinspect_cli::DumpArgs;
use homeinspect_cli::dump_cmd;
use homeinspect_cli::session_cmd;

/// Home-inspection checklist client.
#[derive(Debug, Parser)]
#[command(name = "homeinspect", version)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the checklist hierarchy and print it.
    Dump(DumpArgs),
    /// Interactive session: add results, edit them, submit them.
    Session,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.backend.load_config()?;
    tracing::debug!(?config, "resolved config");

    match cli.command {
        Command::Dump(args) => dump_cmd::run(&config, &args).await,
        Command::Session => session_cmd::run(&config).await,
    }
}
