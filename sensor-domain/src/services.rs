pub mod detector;
pub mod pipeline;
pub mod prompt;
pub mod report_builder;
pub mod statistics;

pub use detector::*;
pub use pipeline::*;
pub use prompt::*;
pub use report_builder::*;
pub use statistics::*;
