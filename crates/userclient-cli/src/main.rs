mod cli;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use userclient::config::loader;
use userclient::observability::init_tracing_with_level;
use userclient::{AuthenticatedClient, UserClientConfig, create_remote_client, create_token_holder};

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing_with_level(&config.logging.level);
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Config => {
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            print!("{rendered}");
        }
        Commands::Login(args) => {
            let remote = create_remote_client(&config).await?;
            commands::users::login(remote.as_ref(), args).await?;
        }
        Commands::Whoami(args) => {
            let remote = create_remote_client(&config).await?;
            commands::users::whoami(remote.as_ref(), &args.token, format).await?;
        }
        Commands::Logout(args) => {
            let remote = create_remote_client(&config).await?;
            commands::users::logout(remote.as_ref(), &args.token).await?;
        }
        Commands::User(args) => {
            let client = make_client(&config, &cli).await?;
            commands::users::user(&client, &args.id, format).await?;
        }
        Commands::Users => {
            let client = make_client(&config, &cli).await?;
            commands::users::users(&client, format).await?;
        }
        Commands::Revoked => {
            let client = make_client(&config, &cli).await?;
            commands::users::revoked(&client, format).await?;
        }
        Commands::Listen(args) => {
            commands::listen::listen(&config, args, format).await?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<UserClientConfig> {
    let mut config =
        loader::load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.service.base_url = base_url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Client for lookups made with the service account.
async fn make_client(config: &UserClientConfig, cli: &Cli) -> Result<AuthenticatedClient> {
    let holder = create_token_holder(&config.service, cli.service_token.as_deref()).context(
        "No service account: set service.username/password or pass --service-token",
    )?;
    let remote = create_remote_client(config).await?;
    Ok(AuthenticatedClient::new(remote, holder))
}
