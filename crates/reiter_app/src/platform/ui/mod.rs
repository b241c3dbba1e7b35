pub mod board;
pub mod render;
