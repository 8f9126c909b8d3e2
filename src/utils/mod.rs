pub mod file_handler;
pub mod settings;
