pub mod health;
pub mod survey;
