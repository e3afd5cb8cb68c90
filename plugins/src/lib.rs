pub mod console;
pub mod editor;
pub mod factory;
pub mod launcher;
pub mod parser;
pub mod sink;
