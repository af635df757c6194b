// Final report: severity banding, retrieval-grounded analysis,
// printable summary and PDF rendering.
// All LLM calls go through llm_client.

pub mod analysis;
pub mod handlers;
pub mod pdf;
pub mod prompts;
pub mod severity;
pub mod summary;

pub use analysis::FinalReport;
