pub mod chat;
pub mod document;
pub mod health;
pub mod json_error;
pub mod uploads;
