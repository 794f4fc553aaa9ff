pub mod text;
pub mod times;
