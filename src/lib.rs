pub mod config;
pub mod detect;
pub mod error;
pub mod i18n;
pub mod openai;
pub mod prompt;
pub mod routes;
pub mod security;
pub mod session;
pub mod translation;
