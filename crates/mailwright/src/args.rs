//! Command-line arguments.

use std::path::PathBuf;

/// Send one message through the configured relay, or the local sendmail
/// when no relay credentials are configured.
#[derive(Debug, clap::Parser)]
#[command(name = "mailwright", version, about)]
pub struct Args {
    /// Path of the JSON configuration file.
    ///
    /// Defaults to `<config dir>/mailwright/config.json`.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Recipient address.
    #[arg(long)]
    pub to: String,

    /// Recipient display name.
    #[arg(long)]
    pub to_name: Option<String>,

    /// Subject line.
    #[arg(short, long)]
    pub subject: String,

    /// File holding the plain-text body; read from stdin when omitted.
    #[arg(short, long)]
    pub body_file: Option<PathBuf>,
}
