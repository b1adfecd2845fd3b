use std::sync::Arc;

use avatar_profile::{notify::TerminalNotifier, store::Profile, App, AppState};
use chrono::Utc;
use clap::Parser;
use cli::{Args, Command};
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if !args.data_dir.is_dir() {
        return Err(eyre!("Data directory {} does not exist", args.data_dir.display()));
    }

    match args.command {
        Command::Init { full_name, email } => {
            let profile = Profile {
                full_name,
                email,
                profile_pic: None,
                created_at: Utc::now(),
            };
            AppState::init_profile(&args.data_dir, profile).wrap_err("Creating profile")?;
        }
        Command::Show => {
            let app = App::new(&args.data_dir, Arc::new(TerminalNotifier))?;
            println!("{}", app.render().await?);
        }
        Command::Upload { mime, files } => {
            let app = App::new(&args.data_dir, Arc::new(TerminalNotifier))?;
            // the notifier already told the user what went wrong
            if app.upload(files.as_slice(), mime.as_deref()).await.is_err() {
                std::process::exit(1);
            }
            println!("{}", app.render().await?);
        }
    }

    Ok(())
}
