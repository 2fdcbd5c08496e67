use anyhow::{Context, Result, bail};
use userclient::AuthenticatedClient;
use userclient_core::RemoteClient;

use crate::cli::{LoginArgs, OutputFormat};
use crate::output::{print_revoked, print_success, print_user, print_users};

pub async fn login(remote: &dyn RemoteClient, args: &LoginArgs) -> Result<()> {
    let token = remote
        .authenticate(&args.username, &args.password)
        .await
        .context("Authentication failed")?;
    print_success(&format!("Authenticated as {}", args.username));
    println!("{token}");
    Ok(())
}

pub async fn whoami(remote: &dyn RemoteClient, token: &str, format: OutputFormat) -> Result<()> {
    let Some(user) = remote
        .fetch_self(token)
        .await
        .context("Failed to resolve token")?
    else {
        bail!("The service returned no user for this token");
    };
    print_user(&user, format)
}

pub async fn logout(remote: &dyn RemoteClient, token: &str) -> Result<()> {
    remote.logout(token).await.context("Logout failed")?;
    print_success("Logged out");
    Ok(())
}

pub async fn user(client: &AuthenticatedClient, id: &str, format: OutputFormat) -> Result<()> {
    let user = client
        .fetch_by_id(id)
        .await
        .with_context(|| format!("Failed to fetch user {id}"))?;
    print_user(&user, format)
}

pub async fn users(client: &AuthenticatedClient, format: OutputFormat) -> Result<()> {
    let users = client.fetch_all().await.context("Failed to list users")?;
    print_users(&users, format)
}

pub async fn revoked(client: &AuthenticatedClient, format: OutputFormat) -> Result<()> {
    let tokens = client
        .revoked_tokens()
        .await
        .context("Failed to list revoked tokens")?;
    print_revoked(&tokens, format)
}
