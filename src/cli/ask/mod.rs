//! Ask command - answer a question about a document and print the result as JSON

use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Document to load
    #[arg(long)]
    pub file: PathBuf,

    /// Declared document type: pdf, docx or txt
    #[arg(long = "type")]
    pub file_type: String,

    /// Question about the document
    pub question: String,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let agent = crate::create_document_qa_agent(&config)?;

    let result = agent
        .process_document_and_query(&args.file, &args.file_type, &args.question)
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
