pub mod client_ext;
pub mod fs;

pub use crate::client_ext::session::{ClientSessionExt as Session, SessionError, SessionHeaders};
pub use crate::fs::{read_json, write_json};
