// src/admin/handlers/mod.rs

pub mod permissions;
pub mod users;
