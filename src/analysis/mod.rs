pub mod agent;
pub mod extract;
pub mod prompt;
