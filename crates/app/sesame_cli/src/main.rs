// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::path::Path;

use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use sesame_core::auth::SessionCookieCodec;
use sesame_core::config::SecurityConfig;

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    match &args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::CheckConfig { path } => check_config(path)?,
        Commands::InspectCookie { config, value } => inspect_cookie(config, value)?,
    }

    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = SecurityConfig::load(Some(path))?;
    log::debug!("{config:?}");
    println!("{}: configuration OK", path.display());
    Ok(())
}

fn inspect_cookie(config: &Path, value: &str) -> Result<()> {
    let config = SecurityConfig::load(Some(config))?;
    let codec = SessionCookieCodec::new(&config.cookie.password);
    let record = codec.decode(value)?;

    println!("username:   {}", record.username());
    println!("auth_type:  {}", record.auth_type());
    println!("anonymous:  {}", record.is_anonymous());
    println!("tenant:     {}", record.tenant().unwrap_or("-"));
    println!("expires_at: {}", record.expires_at().to_rfc3339());
    println!("expired:    {}", record.is_expired_at(Utc::now()));
    Ok(())
}
