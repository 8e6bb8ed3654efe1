pub mod card;
pub mod dataset;
pub mod loaders;
pub mod mapping;
pub mod record;
pub mod result;
pub mod template;

pub use card::ReportCard;
pub use dataset::Dataset;
pub use loaders::{load_dataset, load_mapping, load_template, parse_csv};
pub use mapping::FieldMapping;
pub use record::StudentRecord;
pub use result::{CalculatedResult, Grade, ResultStatus, SubjectResult};
pub use template::TemplateConfig;
