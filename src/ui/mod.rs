pub mod board;
pub mod panels;
pub mod plot;
