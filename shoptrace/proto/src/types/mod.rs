mod convert;
mod error;
mod value;

pub use convert::{FromTagValue, ToTagValue};
pub use error::ProtoError;
pub use value::TagValue;
