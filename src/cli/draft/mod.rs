//! Draft command - interactive drafting conversation on stdin

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::domain::SessionId;
use crate::infrastructure::workflow::DraftingTurn;

#[derive(Args, Debug)]
pub struct DraftArgs {
    /// Resume or name a session (a new id is generated when omitted)
    #[arg(long)]
    pub session: Option<String>,
}

/// Run the drafting conversation until the document is produced or stdin closes
pub async fn run(args: DraftArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let agent = crate::create_drafting_agent(&config)?;

    let session_id = match args.session {
        Some(id) => SessionId::new(id)?,
        None => SessionId::generate(),
    };
    info!(session_id = %session_id, "Drafting session started");
    println!("Session: {}", session_id);

    let existing = agent.session(session_id.as_str()).await?;
    match existing.current_question.as_deref() {
        Some(question) if !existing.is_complete => println!("{}", question),
        _ => println!("What document would you like to draft?"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        let turn = agent.respond(session_id.as_str(), input).await?;
        print_turn(&turn);

        if turn.is_complete {
            break;
        }
    }

    Ok(())
}

fn print_turn(turn: &DraftingTurn) {
    if let Some(error) = &turn.error_message {
        eprintln!("Error: {}", error);
    }
    if let Some(document) = &turn.final_document {
        println!("\n{}", document);
    } else if let Some(question) = &turn.current_question {
        println!("{}", question);
    }
}
