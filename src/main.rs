use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mystery_scout::catalog::Catalog;
use mystery_scout::client::{HttpSearchApi, LocalSearchApi, RequestController, SearchApi};
use mystery_scout::completion::GeminiBackend;
use mystery_scout::config::{
    default_config_path, find_config_file, load_config, Config, LogFormat, API_KEY_ENV,
    LOCAL_CONFIG_FILE,
};
use mystery_scout::models::{SearchKind, SearchOutcome};
use mystery_scout::prompts;
use mystery_scout::search::SearchService;
use mystery_scout::server::{self, AppState};
use mystery_scout::ui::{self, OutputFormat, Status, TerminalView};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Mystery Scout - explore mystery-fiction subgenres with a generative model
#[derive(Parser, Debug)]
#[command(name = "mystery-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find notable authors and overviews of mystery-fiction subgenres", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server (API + static files)
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(long, short)]
        port: Option<u16>,

        /// Directory with the web client (overrides config)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Search a subgenre and print the result
    Search {
        /// Subgenre id or name (see `subgenres`)
        subgenre: String,

        /// What to look for: escritores or subgenero
        #[arg(long, short, default_value = "escritores")]
        kind: SearchKind,

        /// Query a running server instead of calling the model directly
        #[arg(long, short)]
        server: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Only show author names and dates
        #[arg(long)]
        brief: bool,
    },

    /// List the subgenre catalog
    Subgenres {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the prompt a search would send
    Prompt {
        /// Subgenre id or name
        subgenre: String,

        /// escritores or subgenero
        #[arg(long, short, default_value = "escritores")]
        kind: SearchKind,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a configuration file with default settings
    Init {
        /// Where to write it (default: per-user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

fn print_env_vars() {
    println!("Mystery Scout - Environment Variables");
    println!();
    println!("Credentials:");
    println!("  {:<36}Gemini API key (required for serve and local search)", API_KEY_ENV);
    println!();
    println!("Model:");
    println!("  MYSTERY_SCOUT_MODEL                 Gemini model (default: gemini-2.5-flash)");
    println!("  MYSTERY_SCOUT_API_BASE              Generative Language API base URL");
    println!();
    println!("Server:");
    println!("  MYSTERY_SCOUT_SERVER__HOST          Bind host (default: 127.0.0.1)");
    println!("  MYSTERY_SCOUT_SERVER__PORT          Bind port (default: 3000)");
    println!("  MYSTERY_SCOUT_SERVER__STATIC_DIR    Web client directory (default: public)");
    println!();
    println!("Retry:");
    println!("  MYSTERY_SCOUT_RETRY__MAX_ATTEMPTS          Attempts per search (default: 3)");
    println!("  MYSTERY_SCOUT_RETRY__DELAY_MS              Delay between attempts (default: 2000)");
    println!("  MYSTERY_SCOUT_RETRY__ATTEMPT_TIMEOUT_SECS  Per-attempt timeout, 0 disables (default: 60)");
    println!();
    println!("Logging:");
    println!("  MYSTERY_SCOUT_LOGGING__LEVEL        Log level (default: info)");
    println!("  MYSTERY_SCOUT_LOGGING__FORMAT       text or json (default: text)");
    println!("  RUST_LOG                            Overrides the log filter entirely");
    println!();
    println!("Variables are also read from a .env file in the working directory.");
    println!();
    println!("Example:");
    println!("  export {}=\"your-key-here\"", API_KEY_ENV);
    println!("  export MYSTERY_SCOUT_SERVER__PORT=\"8080\"");
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new(format!("mystery_scout={level},tower_http={level}")));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Read the API key or exit with a diagnostic
fn require_api_key(config: &Config) -> String {
    match config.api_key() {
        Some(key) => key.to_string(),
        None => {
            eprintln!(
                "error: {} is not set. Export it or add `api_key` to the configuration file.",
                API_KEY_ENV
            );
            std::process::exit(1);
        }
    }
}

fn search_service(config: &Config) -> SearchService {
    let backend = GeminiBackend::new(require_api_key(config), config.model.clone())
        .with_base_url(config.api_base.clone());
    SearchService::with_backend(Arc::new(backend), config.retry_config())
}

/// Catalog shipped with the web client, falling back to the embedded copy
fn load_catalog(static_dir: &Path) -> Catalog {
    let path = static_dir.join("data").join("subgenres.json");
    if !path.is_file() {
        return Catalog::embedded();
    }
    match Catalog::load(&path) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            Catalog::embedded()
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::debug!("Using config file: {}", path.display());
    }

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            static_dir,
        }) => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(static_dir) = static_dir {
                config.server.static_dir = static_dir;
            }

            let service = search_service(&config);
            let catalog = load_catalog(&config.server.static_dir);
            tracing::info!(
                model = %config.model,
                subgenres = catalog.len(),
                "Starting server"
            );

            let router =
                server::build_router(AppState::new(service, catalog), Some(&config.server.static_dir));
            let addr = config.bind_address();
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;

            server::serve(listener, router).await?;
        }

        Some(Commands::Search {
            subgenre,
            kind,
            server,
            format,
            brief,
        }) => {
            let catalog = load_catalog(&config.server.static_dir);
            let Some(subgenre) = catalog.resolve(&subgenre).cloned() else {
                anyhow::bail!(
                    "Unknown subgenre \"{}\". Run `mystery-scout subgenres` to list them.",
                    subgenre
                );
            };

            let api: Arc<dyn SearchApi> = match server {
                Some(url) => Arc::new(
                    HttpSearchApi::new(&url).with_context(|| format!("Invalid server URL {}", url))?,
                ),
                None => Arc::new(LocalSearchApi::new(Arc::new(search_service(&config)))),
            };

            let view = TerminalView::stdout(format).expand_all(!brief);
            let controller = RequestController::new(api, view);
            controller.select_subgenre(Some(subgenre));

            let search = controller.search(kind);
            tokio::pin!(search);
            let outcome = tokio::select! {
                outcome = &mut search => outcome?,
                _ = tokio::signal::ctrl_c() => {
                    controller.cancel();
                    search.await?
                }
            };

            match outcome {
                SearchOutcome::Success(_) => {}
                SearchOutcome::Failure(_) => return Ok(ExitCode::FAILURE),
                SearchOutcome::Cancelled => {
                    ui::print_status(Status::Warning, "Busca cancelada.");
                    return Ok(ExitCode::from(130));
                }
            }
        }

        Some(Commands::Subgenres { json }) => {
            let catalog = load_catalog(&config.server.static_dir);
            if json {
                println!("{}", serde_json::to_string_pretty(catalog.entries())?);
            } else {
                use comfy_table::{Attribute, Cell, Table};
                let mut table = Table::new();
                table.load_preset(comfy_table::presets::UTF8_FULL);
                table.set_header(vec!["Id", "Subgênero"]);
                for entry in catalog.entries() {
                    table.add_row(vec![
                        Cell::new(&entry.id).add_attribute(Attribute::Bold),
                        Cell::new(&entry.name),
                    ]);
                }
                println!("{table}");
            }
        }

        Some(Commands::Prompt { subgenre, kind }) => {
            let catalog = load_catalog(&config.server.static_dir);
            let id = catalog
                .resolve(&subgenre)
                .map(|entry| entry.id.clone())
                .unwrap_or(subgenre);
            println!("{}", prompts::build_prompt(&id, kind));
        }

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Init { path, force } => {
                let path = path
                    .or_else(default_config_path)
                    .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
                if path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists; pass --force to overwrite it",
                        path.display()
                    );
                }
                Config::default()
                    .save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                ui::print_status(
                    Status::Success,
                    &format!("Wrote default configuration to {}", path.display()),
                );
            }
            ConfigCommands::Show => {
                if let Some(path) = &config_path {
                    ui::print_section(&path.display().to_string());
                }
                print!("{}", config.redacted().to_toml()?);
            }
        },

        None => {
            ui::print_section("Mystery Scout");
            println!("  mystery-scout serve                      Run the web server");
            println!("  mystery-scout search cozy                Find notable cozy-mystery authors");
            println!("  mystery-scout search noir -k subgenero   Read about noir");
            println!("  mystery-scout subgenres                  List the subgenres");
            ui::print_divider();
            println!("Run with --help for all options.");
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["mystery-scout"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(!cli.env);
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["mystery-scout", "-v"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["mystery-scout", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_search_defaults() {
        let cli = Cli::parse_from(["mystery-scout", "search", "cozy"]);
        match cli.command {
            Some(Commands::Search {
                subgenre,
                kind,
                server,
                format,
                brief,
            }) => {
                assert_eq!(subgenre, "cozy");
                assert_eq!(kind, SearchKind::AuthorList);
                assert!(server.is_none());
                assert_eq!(format, OutputFormat::Text);
                assert!(!brief);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_search_with_options() {
        let cli = Cli::parse_from([
            "mystery-scout",
            "search",
            "noir",
            "--kind",
            "subgenero",
            "--server",
            "http://localhost:3000",
            "--format",
            "html",
        ]);
        match cli.command {
            Some(Commands::Search {
                kind,
                server,
                format,
                ..
            }) => {
                assert_eq!(kind, SearchKind::SubgenreEssay);
                assert_eq!(server.as_deref(), Some("http://localhost:3000"));
                assert_eq!(format, OutputFormat::Html);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["mystery-scout", "search", "cozy", "-k", "autores"]).is_err());
    }

    #[test]
    fn test_cli_serve_overrides() {
        let cli = Cli::parse_from(["mystery-scout", "serve", "--port", "8080"]);
        match cli.command {
            Some(Commands::Serve { port, host, .. }) => {
                assert_eq!(port, Some(8080));
                assert!(host.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_config_init() {
        let cli = Cli::parse_from(["mystery-scout", "config", "init", "/tmp/ms.toml", "--force"]);
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Init { path, force },
            }) => {
                assert_eq!(path, Some(PathBuf::from("/tmp/ms.toml")));
                assert!(force);
            }
            _ => panic!("Expected Config init command"),
        }
    }

    #[test]
    fn test_missing_catalog_file_falls_back_to_embedded() {
        let catalog = load_catalog(Path::new("/nonexistent"));
        assert_eq!(catalog, Catalog::embedded());
    }
}
