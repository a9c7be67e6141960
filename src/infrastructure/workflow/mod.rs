//! The three legal assistance workflows and the agents that drive them

mod clarification;
mod document_qa;
mod drafting;
mod prompts;

pub use clarification::{
    ClarificationAgent, ClarificationProgress, ClarificationResult, ClarificationStep,
    ClarificationWorkflow,
};
pub use document_qa::{
    DocumentQaAgent, DocumentQaWorkflow, DocumentUpload, QaProgress, QaResult, QaStep,
    NO_CONTEXT_MESSAGE, NO_DOCUMENTS_MESSAGE,
};
pub use drafting::{
    DraftingAgent, DraftingProgress, DraftingStep, DraftingTurn, DraftingWorkflow,
    LLM_MARKER_PREFIX, TEMPLATE_MARKER,
};
