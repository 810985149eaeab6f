use std::path::Path;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phpsight::config::{self, CONFIG_DIR, DEFAULT_CONFIG};
use phpsight::ipc;
use phpsight::tools::{self, ToolContext};

#[derive(Parser)]
#[command(name = "phpsight")]
#[command(about = "Sandboxed inspection tools for PHP projects, served over stdio JSON-RPC", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, env = "PHPSIGHT_PROJECT_ROOT")]
    project_root: Option<String>,

    /// Log level filter (e.g. debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the JSON-RPC tool server on stdin/stdout (default)
    Serve,

    /// Print the project tree
    Tree {
        /// Directory relative to the project root
        path: Option<String>,
        /// Levels to descend
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Search file contents
    Search {
        /// Text to search for
        pattern: String,
        /// Extensions to search (repeatable)
        #[arg(short, long = "ext")]
        ext: Vec<String>,
        #[arg(long)]
        case_sensitive: bool,
        /// Treat the pattern as a regular expression
        #[arg(long)]
        regex: bool,
    },

    /// Extract the class structure of a PHP file
    Analyze {
        /// File relative to the project root
        path: String,
    },

    /// Find where a class, interface or trait is used
    Usages {
        /// Short or fully qualified name
        symbol: String,
    },

    /// Manage project configuration (.phpsight/config.toml)
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Create default config.toml in .phpsight/ directory
    Init,
    /// Show path to the config file
    Path,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let root = config::resolve_project_root(cli.project_root.as_deref())?;
    let config_dir = root.join(CONFIG_DIR);

    let command = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Config { action } => return handle_config(&config_dir, action),
        other => other,
    };

    let ctx = ToolContext::new(&root, config::load_config(&config_dir));

    let rt = tokio::runtime::Builder::new_multi_thread()
        .thread_name("phpsight-worker")
        .enable_all()
        .build()?;

    rt.block_on(async move {
        match command {
            Commands::Serve => ipc::server::serve(ctx).await,
            Commands::Tree { path, depth } => {
                let result = tools::dispatch(
                    "project_tree",
                    json!({ "path": path, "max_depth": depth }),
                    &ctx,
                )
                .await?;
                println!("{}", result["tree"].as_str().unwrap_or_default());
                Ok(())
            }
            Commands::Search {
                pattern,
                ext,
                case_sensitive,
                regex,
            } => {
                let mut args = json!({
                    "pattern": pattern,
                    "case_sensitive": case_sensitive,
                    "regex": regex,
                });
                if !ext.is_empty() {
                    args["extensions"] = json!(ext);
                }
                print_json(tools::dispatch("search_code", args, &ctx).await?)
            }
            Commands::Analyze { path } => {
                print_json(tools::dispatch("analyze_class", json!({ "path": path }), &ctx).await?)
            }
            Commands::Usages { symbol } => {
                print_json(tools::dispatch("find_usages", json!({ "symbol": symbol }), &ctx).await?)
            }
            Commands::Config { .. } => Ok(()),
        }
    })
}

/// Logs go to stderr; stdout carries the JSON-RPC stream.
fn init_tracing(log_level: &str) {
    let json_logging = std::env::var("PHPSIGHT_LOG_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("phpsight={}", log_level).into());

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json(value: Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn handle_config(config_dir: &Path, action: Option<ConfigAction>) -> anyhow::Result<()> {
    let config_path = config_dir.join("config.toml");

    match action {
        Some(ConfigAction::Path) => {
            println!("{}", config_path.display());
        }
        Some(ConfigAction::Init) => {
            std::fs::create_dir_all(config_dir)?;
            if config_path.exists() {
                eprintln!("Config already exists: {}", config_path.display());
                return Ok(());
            }
            std::fs::write(&config_path, DEFAULT_CONFIG)?;
            println!("Created: {}", config_path.display());
        }
        None => {
            let config = config::load_config(config_dir);
            println!("# Effective config ({})\n", config_path.display());
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
