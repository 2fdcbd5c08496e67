use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "userclient")]
#[command(about = "Query and watch the user service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./userclient.toml when present)
    #[arg(short, long, global = true, env = "USERCLIENT_CONFIG")]
    pub config: Option<String>,

    /// User service base URL (overrides the configuration file)
    #[arg(short = 'u', long, global = true, env = "USERCLIENT_BASE_URL")]
    pub base_url: Option<String>,

    /// Pre-issued service token, used when no service credentials are configured
    #[arg(long, global = true, env = "USERCLIENT_SERVICE_TOKEN", hide_env_values = true)]
    pub service_token: Option<String>,

    /// Log level (overrides the configuration file; RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Exchange credentials for a token
    Login(LoginArgs),
    /// Show the user a token belongs to
    Whoami(TokenArgs),
    /// End the session of a token
    Logout(TokenArgs),
    /// Look up a user by id
    User(UserArgs),
    /// List all users
    Users,
    /// List revoked tokens
    Revoked,
    /// Print change notifications as they arrive
    Listen(ListenArgs),
    /// Print the effective configuration
    Config,
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Username
    #[arg(long)]
    pub username: String,
    /// Password
    #[arg(long, env = "USERCLIENT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(clap::Args)]
pub struct TokenArgs {
    /// Token to act on
    #[arg(short, long)]
    pub token: String,
}

#[derive(clap::Args)]
pub struct UserArgs {
    /// User id
    pub id: String,
}

#[derive(clap::Args)]
pub struct ListenArgs {
    /// Channel to subscribe to (overrides the configuration file)
    #[arg(long)]
    pub channel: Option<String>,
    /// Stop after this many messages
    #[arg(long)]
    pub count: Option<usize>,
}
