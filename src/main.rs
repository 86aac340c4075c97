use clap::{Parser, Subcommand};
use graphbind::error::Result;

mod cli;

#[derive(Parser)]
#[command(name = "graphbind")]
#[command(version = "0.1.0")]
#[command(about = "Bind GraphQL arguments to database records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and schema without serving
    Check {
        /// Config file path
        #[arg(long, default_value = "graphbind.toml")]
        config: String,
    },

    /// Start GraphQL server
    Serve {
        /// Config file path
        #[arg(long, default_value = "graphbind.toml")]
        config: String,

        /// Server port
        #[arg(long, default_value_t = 4000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => {
            cli::check::run(config).await?;
        }
        Commands::Serve { config, port } => {
            cli::serve::run(config, port).await?;
        }
    }

    Ok(())
}
