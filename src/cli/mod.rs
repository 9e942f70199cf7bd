use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use uuid::Uuid;

use crate::auth::JwtAuth;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "todoctl")]
#[command(about = "Todo API admin tool - tokens, migrations and connectivity checks")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint a bearer token for a user with the configured JWT secret")]
    Token {
        #[arg(long, help = "User id (UUID) placed in the token subject")]
        user: Uuid,

        #[arg(long, help = "Validity in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Verify database connectivity")]
    Check,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Token { user, hours } => {
            let auth = JwtAuth::from_config(&config.security);
            let hours = hours.unwrap_or(config.security.jwt_expiry_hours);
            let token = auth
                .issue_for(user, hours)
                .context("set JWT_SECRET to mint tokens")?;

            if cli.json {
                println!("{}", json!({ "user": user, "hours": hours, "token": token }));
            } else {
                println!("{token}");
            }
        }
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            DatabaseManager::close(&pool).await;
            report(cli.json, "migrate", "Migrations applied");
        }
        Commands::Check => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::health_check(&pool).await?;
            DatabaseManager::close(&pool).await;
            report(cli.json, "check", "Database reachable");
        }
    }

    Ok(())
}

fn report(as_json: bool, command: &str, message: &str) {
    if as_json {
        println!("{}", json!({ "command": command, "status": "ok", "message": message }));
    } else {
        println!("{message}");
    }
}
