pub mod media;
pub mod recipe;
