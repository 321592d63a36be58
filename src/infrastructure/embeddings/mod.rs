pub mod noop;
pub mod normalized;
pub mod openai;
