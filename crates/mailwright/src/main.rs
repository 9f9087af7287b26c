//! `mailwright` - send one plain-text message from the command line.
//!
//! The relay and sender come from a JSON configuration file; the body is
//! read from `--body-file` or stdin.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod args;
mod config;

use anyhow::Context;
use clap::Parser;
use mailwright_core::{Delivery, Mailer, OutgoingMessage};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;
use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mailwright=info,mailwright_core=info,mailwright_smtp=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let path = args.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&path).await?;
    let body = read_body(&args).await?;

    let mut message = OutgoingMessage::new(
        config.mail_from.as_str(),
        args.to.as_str(),
        args.subject.as_str(),
        body,
    )
    .from_name(config.mail_from_name.as_str());
    if let Some(name) = args.to_name.as_deref() {
        message = message.to_name(name);
    }

    let delivery = Mailer::new(config.mailer_config())
        .send(&message)
        .await
        .with_context(|| format!("Cannot send mail to {}", args.to))?;

    match delivery {
        Delivery::Smtp {
            receipt,
            message_id,
        } => println!(
            "{message_id} accepted by relay{}",
            if receipt.encrypted { " (encrypted)" } else { "" }
        ),
        Delivery::LocalSubmission { message_id } => {
            println!("{message_id} handed to local sendmail");
        }
    }
    Ok(())
}

async fn read_body(args: &Args) -> anyhow::Result<String> {
    if let Some(path) = &args.body_file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read body file {}", path.display()));
    }

    let mut body = String::new();
    tokio::io::stdin()
        .read_to_string(&mut body)
        .await
        .context("Cannot read body from stdin")?;
    Ok(body)
}
