// src/models/mod.rs

pub mod campus_drive;
pub mod exam;
