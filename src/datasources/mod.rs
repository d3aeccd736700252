pub mod export;

pub use export::{load_document, load_report_input, load_submission, ReportInput};
