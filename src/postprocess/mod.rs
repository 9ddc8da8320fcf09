pub mod gif;
pub mod resize;
