//! Document ingestion: turning uploaded files into passages
//!
//! - [`extractor`] decodes PDF and plain-text uploads into a single document string
//! - [`chunker`] splits that string into overlapping passages sized for embedding

pub mod chunker;
pub mod extractor;

pub use chunker::reassemble;
pub use chunker::Chunker;
pub use chunker::Passage;
pub use extractor::extract_batch;
pub use extractor::extract_text;
pub use extractor::DocumentKind;
pub use extractor::ExtractionReport;
pub use extractor::FileReport;
pub use extractor::UploadedFile;
