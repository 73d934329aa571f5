//! `SeaORM` entities for the school schema

pub mod prelude;

pub mod auth_identity;
pub mod class;
pub mod profile;
pub mod sea_orm_active_enums;
pub mod storage_object;
pub mod student;
pub mod subject;
pub mod teacher;
pub mod teacher_subject;
