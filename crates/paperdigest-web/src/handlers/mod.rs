pub mod digest;
pub mod index;
