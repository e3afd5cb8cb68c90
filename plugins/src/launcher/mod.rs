pub mod exit_codes;
pub mod java;
mod supervise;

pub use exit_codes::describe_tlc_exit;
pub use java::JavaToolLauncher;
