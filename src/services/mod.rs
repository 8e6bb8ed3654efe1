pub mod archive_builder;
pub mod card_template;
pub mod file_naming;
pub mod grade_classifier;
pub mod output_sink;
pub mod result_calculator;

pub use archive_builder::{ArchiveBuilder, NamePolicy};
pub use card_template::render_card_html;
pub use file_naming::{pdf_file_name, safe_name, BULK_ARCHIVE_NAME};
pub use grade_classifier::classify;
pub use output_sink::{ExportArtifact, OutputSink};
pub use result_calculator::compute_result;
