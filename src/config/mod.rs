pub mod locate;
pub mod options;
