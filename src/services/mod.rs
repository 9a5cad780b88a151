pub mod attachment_extractor;
pub mod criteria_provider;
pub mod email_service;
pub mod error_ledger;
pub mod llm_service;
pub mod notebook;

pub use attachment_extractor::AttachmentExtractor;
pub use criteria_provider::{load_criteria_file, CriteriaProvider};
pub use email_service::EmailService;
pub use error_ledger::ErrorLedger;
pub use llm_service::LlmService;
