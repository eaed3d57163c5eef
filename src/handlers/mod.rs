pub mod document;
pub mod health;
