#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for replaying IMAP session transcripts

use clap::{Parser, Subcommand};
use mailbox_session::replay::{load_script, run_script};
use mailbox_session::{MailboxTree, NodeId, SequentialIssuer, Session, SessionConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mailbox-cli")]
#[command(about = "Replay IMAP response transcripts through the session core")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON-lines transcript and print the resulting session
    Replay {
        /// Transcript file
        script: PathBuf,
    },
}

#[derive(Serialize)]
struct Report<'a> {
    state: String,
    capabilities: Vec<&'a str>,
    issued: Vec<String>,
    tree: mailbox_session::MailboxSnapshot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = SessionConfig::from_env()?;

    match &args.command {
        Command::Replay { script } => cmd_replay(&args, &config, script).await?,
    }

    Ok(())
}

async fn cmd_replay(args: &Args, config: &SessionConfig, script: &Path) -> anyhow::Result<()> {
    let steps = load_script(script).await?;
    let mut session = Session::with_config(config);
    let mut issuer = SequentialIssuer::from_config(config);

    run_script(&mut session, &mut issuer, steps)?;

    let tree = session.tree();
    if args.json {
        let report = Report {
            state: session.state().to_string(),
            capabilities: session.capabilities().iter().map(String::as_str).collect(),
            issued: issuer.issued().iter().map(ToString::to_string).collect(),
            tree: tree.snapshot(tree.root())?,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("State: {}", session.state());
        if session.capabilities_fresh() {
            let caps: Vec<&str> = session.capabilities().iter().map(String::as_str).collect();
            println!("Capabilities: {}", caps.join(" "));
        }
        println!();
        print_tree(tree, tree.root(), 0)?;
    }

    Ok(())
}

fn print_tree(tree: &MailboxTree, node: NodeId, depth: usize) -> anyhow::Result<()> {
    for child in tree.children_of(node)? {
        let mailbox = tree.node(*child)?;
        println!("{}{}", "  ".repeat(depth), mailbox.display_name());
        print_tree(tree, *child, depth + 1)?;
    }
    Ok(())
}
