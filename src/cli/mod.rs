//! Command-line interface.
//!
//! - (no subcommand) or `serve` - start the HTTP server
//! - `seed-admin` - create the bootstrap admin account and exit
//! - `config-check` - validate the configuration file

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::auth::{ensure_initial_admin, AuthService};
use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "planboard")]
#[command(author, version, about = "Project management server", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "PLANBOARD_CONFIG", default_value = "planboard.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Directory with the built frontend, served for unmatched paths
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Create the configured admin account if no admin exists yet
    SeedAdmin,

    /// Validate the configuration file and print a summary
    ConfigCheck,
}

/// Run a one-shot subcommand. `serve` is handled by the binary.
pub async fn run_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::SeedAdmin) => cmd_seed_admin(cli).await,
        Some(Commands::ConfigCheck) => cmd_config_check(cli),
        Some(Commands::Serve { .. }) | None => Ok(()),
    }
}

async fn cmd_seed_admin(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    std::fs::create_dir_all(&config.server.data_dir)?;
    let db = crate::db::init(&config.server.data_dir).await?;
    let auth = AuthService::from_config(db, &config)?;

    let created = ensure_initial_admin(
        &auth,
        &config.auth.admin_name,
        &config.auth.admin_email,
        &config.auth.admin_password,
    )
    .await?;

    if created {
        println!("[OK] Created admin account {}", config.auth.admin_email);
    } else {
        println!("[--] An admin account already exists, nothing to do");
    }
    Ok(())
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!("[!!] Configuration file not found: {}", config_path.display());
        println!();
        println!("A default configuration will be used when starting the server.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("Server:");
            println!("  Host:         {}", config.server.host);
            println!("  Port:         {}", config.server.port);
            println!("  Data Dir:     {}", config.server.data_dir.display());
            println!("  Environment:  {:?}", config.server.environment);
            println!();
            println!("Sessions:");
            println!("  Cookie:       {}", config.auth.cookie_name);
            println!("  Lifetime:     {} days", config.auth.session_ttl_days);
            println!(
                "  Secure flag:  {}",
                if config.server.environment.is_production() {
                    "Enabled"
                } else {
                    "Disabled"
                }
            );
            println!();

            let warnings = config_warnings(&config);
            if !warnings.is_empty() {
                println!("Warnings:");
                for warning in warnings {
                    println!("  [!] {}", warning);
                }
                println!();
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            anyhow::bail!("Invalid configuration file");
        }
    }
}

fn config_warnings(config: &Config) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    let defaults = Config::default();

    if config.auth.admin_password == defaults.auth.admin_password {
        warnings.push("Bootstrap admin uses the default password - change it after first login");
    }
    if config.server.environment.is_production() && config.auth.hash_memory_kib < 8 * 1024 {
        warnings.push("Password hashing memory cost is below 8 MiB in production");
    }

    warnings
}
