pub mod catalog;
pub mod encoding;
pub mod screenshot;
