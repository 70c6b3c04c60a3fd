pub mod writer;

pub use writer::write_audit_workbook;
