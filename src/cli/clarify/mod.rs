//! Clarify command - research a legal question and print the result as JSON

use clap::Args;

use crate::domain::SummaryMode;

#[derive(Args, Debug)]
pub struct ClarifyArgs {
    /// The legal question to research
    pub query: String,

    /// Short focused answer instead of a comprehensive summary with citations
    #[arg(long)]
    pub quick: bool,
}

pub async fn run(args: ClarifyArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let agent = crate::create_clarification_agent(&config)?;

    let mode = if args.quick {
        SummaryMode::Quick
    } else {
        SummaryMode::Comprehensive
    };
    let result = agent.clarify(&args.query, mode).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
