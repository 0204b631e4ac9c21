//! Value objects - immutable types that represent protocol concepts

mod epoch_time;
mod message_ts;
mod presence;

pub use epoch_time::EpochTime;
pub use message_ts::{MessageTs, MessageTsParseError};
pub use presence::Presence;
