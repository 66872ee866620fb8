pub mod console_prompt;
pub mod file_storage;
pub mod token_endpoint;

pub use console_prompt::ConsolePrompt;
pub use file_storage::FileStorage;
pub use token_endpoint::HttpTokenEndpoint;
