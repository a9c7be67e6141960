//! Sessions command - list or delete saved drafting sessions

use clap::{Args, Subcommand};

use crate::domain::{SessionId, SessionStore};
use crate::infrastructure::session::FileSessionStore;

#[derive(Args, Debug)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub action: SessionsAction,
}

#[derive(Subcommand, Debug)]
pub enum SessionsAction {
    /// List saved session ids
    List,

    /// Delete a saved session
    Delete { id: String },
}

/// Works on the session directory directly, so no backend key is needed
pub async fn run(args: SessionsArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let store = FileSessionStore::new(&config.drafting.sessions_dir)?;

    match args.action {
        SessionsAction::List => {
            for id in store.list().await? {
                println!("{}", id);
            }
        }
        SessionsAction::Delete { id } => {
            let id = SessionId::new(id)?;
            if store.delete(&id).await? {
                println!("Deleted session {}", id);
            } else {
                println!("Session {} not found", id);
            }
        }
    }

    Ok(())
}
