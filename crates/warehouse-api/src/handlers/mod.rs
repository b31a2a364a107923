pub mod image;
pub mod music;
pub mod pdf;
pub mod presentation;
