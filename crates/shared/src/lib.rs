pub mod domain;
pub mod error;
pub mod protocol;

pub use domain::{Column, ComponentPalette, ComponentRef, InsertPosition, Layout, Row};
pub use error::{ApiError, ErrorCode, LayoutError};
pub use protocol::Resource;
