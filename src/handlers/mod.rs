// src/handlers/mod.rs
pub mod chat;
pub mod relay;
pub mod ui;
