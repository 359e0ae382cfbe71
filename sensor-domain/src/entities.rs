pub mod config;
pub mod dashboard;
pub mod report;
pub mod table;

pub use config::*;
pub use dashboard::*;
pub use report::*;
pub use table::*;
