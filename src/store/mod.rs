pub mod csv;
pub mod sheet;

pub use csv::{read_catalog, read_catalog_file, write_catalog, write_catalog_file};
pub use sheet::{export_url, fetch_catalog};
