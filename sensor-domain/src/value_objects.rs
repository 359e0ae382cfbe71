// Value objects: small immutable types shared across layers

pub mod anomaly_label;
pub mod column_kind;
pub mod notice_level;

pub use anomaly_label::*;
pub use column_kind::*;
pub use notice_level::*;
