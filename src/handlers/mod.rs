pub mod catalog;
pub mod cloudkit;
pub mod pages;
pub mod screenshots;
pub mod session;
