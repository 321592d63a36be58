pub mod add_document;
pub mod chat_tasks;
pub mod enhance;
pub mod process_task;
pub mod retrieve;
pub mod stats;
