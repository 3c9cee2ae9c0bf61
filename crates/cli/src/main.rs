use std::sync::Arc;

use anyhow::Context;
use bookshelf_app::BookCatalog;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "In-memory book catalog service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the merged OpenAPI document
    Openapi,
    /// Print the effective settings as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            bookshelf_telemetry::init(&settings.telemetry);
            tracing::info!(env = ?settings.environment, "bookshelf CLI serving");
            bookshelf_app::serve(settings).await
        }
        Command::Openapi => {
            let registry = bookshelf_app::build_registry(Arc::new(BookCatalog::seeded()))?;
            let doc = bookshelf_http::router::openapi_document(&registry);
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_accepts_port_override() {
        let cli = Cli::try_parse_from(["bookshelf", "serve", "--port", "9090"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Serve { port: Some(9090) })));
    }

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["bookshelf"]).unwrap();
        assert!(cli.command.is_none());
    }
}
