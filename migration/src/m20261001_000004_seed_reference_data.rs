use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SEED_ACADEMIC_YEAR: &str = "2026-2027";

/// (name, level, room)
const SEED_CLASSES: [(&str, i32, &str); 3] = [
    ("Grade 1", 1, "101"),
    ("Grade 2", 2, "102"),
    ("Grade 3", 3, "103"),
];

/// (code, name, description)
const SEED_SUBJECTS: [(&str, &str, &str); 5] = [
    ("MATH", "Mathematics", "Arithmetic, algebra and geometry"),
    ("ENG", "English", "Reading, writing and grammar"),
    ("SCI", "Science", "General science"),
    ("HIST", "History", "Local and world history"),
    ("PE", "Physical Education", "Sports and fitness"),
];

fn seed_error(e: impl std::fmt::Display) -> DbErr {
    DbErr::Migration(format!("Failed to build seed statement: {e}"))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut classes = Query::insert();
        classes
            .into_table(Classes::Table)
            .columns([
                Classes::Name,
                Classes::Level,
                Classes::Section,
                Classes::AcademicYear,
                Classes::Capacity,
                Classes::RoomNumber,
            ])
            .on_conflict(
                OnConflict::columns([Classes::Name, Classes::Section, Classes::AcademicYear])
                    .do_nothing()
                    .to_owned(),
            );
        for (name, level, room) in SEED_CLASSES {
            classes
                .values([
                    name.into(),
                    level.into(),
                    "A".into(),
                    SEED_ACADEMIC_YEAR.into(),
                    30.into(),
                    room.into(),
                ])
                .map_err(seed_error)?;
        }
        manager.exec_stmt(classes).await?;

        let mut subjects = Query::insert();
        subjects
            .into_table(Subjects::Table)
            .columns([Subjects::Code, Subjects::Name, Subjects::Description])
            .on_conflict(OnConflict::column(Subjects::Code).do_nothing().to_owned());
        for (code, name, description) in SEED_SUBJECTS {
            subjects
                .values([code.into(), name.into(), description.into()])
                .map_err(seed_error)?;
        }
        manager.exec_stmt(subjects).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Subjects::Table)
                    .and_where(Expr::col(Subjects::Code).is_in(SEED_SUBJECTS.map(|(code, _, _)| code)))
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Classes::Table)
                    .and_where(Expr::col(Classes::AcademicYear).eq(SEED_ACADEMIC_YEAR))
                    .and_where(Expr::col(Classes::Name).is_in(SEED_CLASSES.map(|(name, _, _)| name)))
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Classes {
    Table,
    Name,
    Level,
    Section,
    AcademicYear,
    Capacity,
    RoomNumber,
}

#[derive(DeriveIden)]
enum Subjects {
    Table,
    Code,
    Name,
    Description,
}
