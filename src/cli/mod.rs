//! CLI module for Legal Assist
//!
//! Provides one subcommand per agent:
//! - `draft`: interactive document drafting
//! - `clarify`: legal clarification through web search
//! - `ask`: question answering over a document
//! - `sessions`: manage saved drafting sessions

pub mod ask;
pub mod clarify;
pub mod draft;
pub mod sessions;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Legal Assist - drafting, clarification and document QA with LLM fallback
#[derive(Parser)]
#[command(name = "legal-assist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Draft an NDA, contract or lease agreement interactively
    Draft(draft::DraftArgs),

    /// Research a legal question and summarise the findings
    Clarify(clarify::ClarifyArgs),

    /// Ask a question about a PDF, DOCX or TXT document
    Ask(ask::AskArgs),

    /// List or delete saved drafting sessions
    Sessions(sessions::SessionsArgs),
}

/// Load `.env` and configuration, then install logging
fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);
    config
}
