use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use userclient_core::{Message, RevokedToken, User};

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}

pub fn print_users(users: &[User], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(users),
        OutputFormat::Table => {
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Username", "Email", "Active", "Roles", "Platforms"]);
            for user in users {
                builder.push_record([
                    user.id.clone(),
                    user.username.clone(),
                    user.email.clone(),
                    user.active.to_string(),
                    user.roles.join(","),
                    user.platform_names.join(","),
                ]);
            }
            let table = builder.build().with(Style::rounded()).to_string();
            println!("{table}");
            println!("Total: {}", users.len());
            Ok(())
        }
    }
}

pub fn print_user(user: &User, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(user),
        OutputFormat::Table => print_users(std::slice::from_ref(user), format),
    }
}

pub fn print_revoked(tokens: &[RevokedToken], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(tokens),
        OutputFormat::Table => {
            if tokens.is_empty() {
                println!("No revoked tokens.");
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(["Token", "Expires", "Remaining (s)"]);
            for token in tokens {
                builder.push_record([
                    token.token.clone(),
                    token.expired_at.to_string(),
                    token.ttl().whole_seconds().max(0).to_string(),
                ]);
            }
            let table = builder.build().with(Style::rounded()).to_string();
            println!("{table}");
            Ok(())
        }
    }
}

pub fn print_message(msg: &Message, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string(msg).context("Failed to render JSON")?;
            println!("{rendered}");
        }
        OutputFormat::Table => {
            println!("{} {} {}", msg.source.cyan(), msg.event.bold(), msg.payload);
        }
    }
    Ok(())
}
