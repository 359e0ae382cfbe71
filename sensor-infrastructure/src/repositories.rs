pub mod report_store;

pub use report_store::*;
