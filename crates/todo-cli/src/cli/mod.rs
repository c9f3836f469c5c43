//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use todo_core::api::ApiClient;
use todo_core::config::{self, Config};
use todo_core::logging;
use todo_core::routes::{Route, navigate};
use todo_core::session::SessionStore;
use todo_core::storage::LocalStorage;

mod commands;
mod term;

#[derive(Parser)]
#[command(name = "todo")]
#[command(version)]
#[command(about = "Manage your TODO list from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the API base URL (also TODO_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TODO_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "TODO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out (clear the stored session)
    Logout,

    /// Show the logged-in user
    Profile,

    /// Manage TODOs (lists them when no subcommand is given)
    Tasks {
        #[command(subcommand)]
        command: Option<TaskCommands>,
    },

    /// Open a view by path (/, /login, /register, /profile)
    Open {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum TaskCommands {
    /// List all TODOs
    List,
    /// Create a TODO
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: String,
    },
    /// Edit a TODO (omitted fields keep their current value)
    Edit {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a TODO
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print a fresh config from Rust defaults (for xtask)
    Generate,
    /// Store the API base URL in the config file
    SetApiUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

/// Everything a view needs: config, the session, and how to reach the API.
pub struct App {
    pub config: Config,
    pub store: SessionStore,
    api_url_override: Option<String>,
    pub assume_yes: bool,
}

impl App {
    pub fn api(&self) -> Result<ApiClient> {
        let base_url = self
            .config
            .resolve_api_base_url(self.api_url_override.as_deref())?;
        ApiClient::new(&base_url, self.config.request_timeout()).context("build API client")
    }

    /// Checks the session against `route`'s policy.
    pub fn enter(&self, route: Route) -> Result<Route> {
        Ok(navigate(route, &self.store.current()).into_result()?)
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        api_url,
        yes,
    } = cli;

    // Config commands work even when the config file is broken.
    let command = match command {
        Some(Commands::Config { command }) => return run_config_command(command),
        other => other,
    };

    let config = Config::load().context("load config")?;
    let _log_guard = init_logging(&config);

    let storage = LocalStorage::open_default().context("open session storage")?;
    let mut app = App {
        config,
        store: SessionStore::initialize(storage),
        api_url_override: api_url,
        assume_yes: yes,
    };

    let Some(command) = command else {
        return commands::nav::open(&app, Route::Home).await;
    };

    match command {
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            commands::auth::register(&app, name, email, password, confirm_password).await
        }
        Commands::Login { email, password } => {
            commands::auth::login(&mut app, email, password).await
        }
        Commands::Logout => commands::auth::logout(&mut app),
        Commands::Profile => commands::profile::show(&app),
        Commands::Tasks { command } => match command.unwrap_or(TaskCommands::List) {
            TaskCommands::List => commands::tasks::list(&app).await,
            TaskCommands::Add { title, description } => {
                commands::tasks::add(&app, title, description).await
            }
            TaskCommands::Edit {
                id,
                title,
                description,
            } => commands::tasks::edit(&app, &id, title, description).await,
            TaskCommands::Delete { id } => commands::tasks::delete(&app, &id).await,
        },
        Commands::Open { path } => commands::nav::open(&app, Route::parse(&path)).await,
        Commands::Config { command } => run_config_command(command),
    }
}

fn run_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => commands::config::path(),
        ConfigCommands::Init => commands::config::init(),
        ConfigCommands::Generate => commands::config::generate(),
        ConfigCommands::SetApiUrl { url } => commands::config::set_api_url(&url),
    }
}

/// Logging is best effort: a view should still work without a log file.
fn init_logging(config: &Config) -> Option<logging::WorkerGuard> {
    let logs_dir = config::paths::logs_dir().ok()?;
    match logging::init(&logs_dir, &config.log_level) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    }
}
