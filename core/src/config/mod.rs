mod load;
mod types;

pub use load::{load_default, load_from, CONFIG_FILE_NAME};
pub use types::*;
