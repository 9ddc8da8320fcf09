pub mod args;
pub mod classify;
pub mod launcher;
