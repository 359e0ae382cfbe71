pub mod analyze_handlers;
pub mod ops_handlers;
pub mod page_handlers;
pub mod report_handlers;

pub use analyze_handlers::*;
pub use ops_handlers::*;
pub use page_handlers::*;
pub use report_handlers::*;
