pub mod csv_loader;
pub mod toml_loader;

pub use csv_loader::{load_dataset, parse_csv};
pub use toml_loader::{load_mapping, load_template};
