mod blob;
mod date;
mod object_id;
mod timestamp;

pub use blob::Blob;
pub use date::Date;
pub use object_id::{ObjectId, ObjectIdError};
pub use timestamp::Timestamp;

use thiserror::Error as ThisError;

///
/// TimeParseError
///

#[derive(Debug, ThisError)]
pub enum TimeParseError {
    #[error("time parse error: {0}")]
    Parse(String),

    #[error("instant out of representable range: {0}")]
    OutOfRange(String),
}
