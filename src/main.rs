//! Tooltip simulator CLI
//!
//! Loads a markup file, optionally replays a script of pointer and mutation
//! steps against it, then dumps the resulting page state.
//!
//! Usage:
//!   tipsim page.html                         # load and dump
//!   tipsim page.html --script steps.json     # replay steps first
//!   tipsim page.html --json                  # machine-readable report

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use tipsim::Page;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tipsim")]
#[command(about = "Tooltip and popover simulator")]
struct Cli {
    /// Markup file to load
    markup: PathBuf,

    /// JSON array of steps to replay before dumping
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Emit the final state as JSON instead of a text dump
    #[arg(long)]
    json: bool,

    /// Show only visible popovers in the text dump
    #[arg(long)]
    visible_only: bool,
}

/// One scripted interaction, tagged by `op`.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
enum Step {
    Hover { selector: String },
    Unhover,
    Click { selector: String },
    MoveMouse { x: f64, y: f64 },
    Advance { ms: u64 },
    SetAttribute { selector: String, name: String, value: String },
    RemoveAttribute { selector: String, name: String },
    InsertMarkup { selector: String, markup: String },
    Remove { selector: String },
    ShowTemporary { selector: String, content: String },
    Flush,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut page = Page::load(&cli.markup)?;

    if let Some(script) = &cli.script {
        let text = fs::read_to_string(script)?;
        let steps: Vec<Step> = serde_json::from_str(&text)?;
        for step in steps {
            run_step(&mut page, step)?;
        }
    }

    page.flush();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&page.report())?);
    } else {
        print!("{}", page.dump(cli.visible_only));
    }
    Ok(())
}

fn run_step(page: &mut Page, step: Step) -> tipsim::Result<()> {
    match step {
        Step::Hover { selector } => page.hover(&selector)?,
        Step::Unhover => page.unhover(),
        Step::Click { selector } => page.click(&selector)?,
        Step::MoveMouse { x, y } => page.move_mouse_to(x, y),
        Step::Advance { ms } => page.advance_ms(ms),
        Step::SetAttribute {
            selector,
            name,
            value,
        } => page.set_attribute(&selector, &name, &value)?,
        Step::RemoveAttribute { selector, name } => page.remove_attribute(&selector, &name)?,
        Step::InsertMarkup { selector, markup } => {
            page.insert_markup(&selector, &markup)?;
        }
        Step::Remove { selector } => page.remove(&selector)?,
        Step::ShowTemporary { selector, content } => page.show_temporary(&selector, &content)?,
        Step::Flush => page.flush(),
    }
    Ok(())
}
