use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// Show a profile and replace its avatar
pub(crate) struct Args {
    #[arg(short, long, env = "AVATAR_PROFILE_DATA_DIR")]
    /// Directory holding the profile state. Must already exist
    pub(crate) data_dir: PathBuf,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create the signed-in profile
    Init {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
    },
    /// Print the profile screen
    Show,
    /// Replace the avatar with the first of the given images
    Upload {
        #[arg(long)]
        /// Declared MIME type, guessed from the extension when absent
        mime: Option<String>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}
