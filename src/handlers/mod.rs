// src/handlers/mod.rs

pub mod auth;
pub mod campus_drive;
pub mod exam;
