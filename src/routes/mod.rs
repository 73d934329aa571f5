pub mod auth;
pub mod classes;
pub mod health;
pub mod profile;
pub mod stats;
pub mod storage;
pub mod students;
pub mod subjects;
pub mod teacher_subjects;
pub mod teachers;
