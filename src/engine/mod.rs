pub mod board;
pub mod content;
pub mod error;
pub mod events;
pub mod flip;
pub mod game;
pub mod hint;
pub mod records;
pub mod resolve;
pub mod rules;
pub mod scheduler;
pub mod scoring;
pub mod session_save;
pub mod state;
pub mod store;
