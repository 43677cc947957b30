pub mod ingredient;
pub mod recipe;
pub mod shared;
pub mod tag;
