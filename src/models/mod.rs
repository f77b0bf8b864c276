// src/models/mod.rs

pub mod army_video;
pub mod draft;
pub mod exam;
pub mod note;
pub mod question;
pub mod result;
pub mod student;
pub mod video;
