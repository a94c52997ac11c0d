use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::ConfigArgs;

#[derive(Parser, Debug)]
#[command(name = "supagate", version, about = "Supabase tool-call gateway")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP gateway.
    Serve,

    /// Print the tool catalog.
    Tools {
        /// Print the raw `tools/list` JSON instead of a summary
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run a single tool call against the configured backend and print the result.
    Call {
        /// Tool name, e.g. supabase_query
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `tools --json` and `call` output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve => commands::serve::run(cli.config.load()?).await?,
        Command::Tools { json } => commands::tools::list(json)?,
        Command::Call { tool, args } => commands::call::run(cli.config.load()?, &tool, &args).await?,
    }

    Ok(())
}
