pub mod framing;
pub mod tlc;

pub use tlc::{TlcOutputState, TlcToolOutputParser, DEFAULT_MAX_OUTPUT_LINES};
