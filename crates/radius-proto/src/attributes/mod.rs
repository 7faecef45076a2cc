mod attribute;
pub mod tunnel;
mod types;

pub use attribute::Attribute;
pub use tunnel::{TunnelAttribute, TunnelValue};
pub use types::AttributeType;
