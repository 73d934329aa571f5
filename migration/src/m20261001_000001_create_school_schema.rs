use crate::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================
        // ENUM TYPES
        // ============================================

        manager
            .create_type(
                Type::create()
                    .as_enum(UserRole::Table)
                    .values([
                        UserRole::Admin,
                        UserRole::Teacher,
                        UserRole::Student,
                        UserRole::Parent,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(StudentStatus::Table)
                    .values([
                        StudentStatus::Active,
                        StudentStatus::Inactive,
                        StudentStatus::Graduated,
                        StudentStatus::Transferred,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(EmploymentStatus::Table)
                    .values([
                        EmploymentStatus::Active,
                        EmploymentStatus::OnLeave,
                        EmploymentStatus::Terminated,
                    ])
                    .to_owned(),
            )
            .await?;

        // ============================================
        // IDENTITY TABLES
        // ============================================

        manager
            .create_table(
                Table::create()
                    .table(AuthIdentities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthIdentities::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(
                        ColumnDef::new(AuthIdentities::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(AuthIdentities::EncryptedPassword)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AuthIdentities::RawUserMetaData)
                            .json_binary()
                            .not_null()
                            .extra("DEFAULT '{}'::jsonb".to_string()),
                    )
                    .col(
                        ColumnDef::new(AuthIdentities::LastSignInAt)
                            .timestamp()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AuthIdentities::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(AuthIdentities::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::Email).string().not_null())
                    .col(
                        ColumnDef::new(Profiles::FirstName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Profiles::LastName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Profiles::Role)
                            .enumeration(
                                UserRole::Table,
                                [
                                    UserRole::Admin,
                                    UserRole::Teacher,
                                    UserRole::Student,
                                    UserRole::Parent,
                                ],
                            )
                            .not_null()
                            .default("student"),
                    )
                    .col(ColumnDef::new(Profiles::Phone).string_len(32).null())
                    .col(ColumnDef::new(Profiles::Address).text().null())
                    .col(ColumnDef::new(Profiles::AvatarUrl).string().null())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_auth_identity")
                            .from_tbl(Profiles::Table)
                            .from_col(Profiles::Id)
                            .to_tbl(AuthIdentities::Table)
                            .to_col(AuthIdentities::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profiles_role")
                    .table(Profiles::Table)
                    .col(Profiles::Role)
                    .to_owned(),
            )
            .await?;

        // ============================================
        // REFERENCE TABLES
        // ============================================

        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Classes::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Classes::Name).string().not_null())
                    .col(ColumnDef::new(Classes::Level).integer().not_null())
                    .col(
                        ColumnDef::new(Classes::Section)
                            .string_len(10)
                            .not_null()
                            .default("A"),
                    )
                    .col(
                        ColumnDef::new(Classes::AcademicYear)
                            .string_len(9)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Classes::Capacity)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(ColumnDef::new(Classes::RoomNumber).string_len(32).null())
                    .col(
                        ColumnDef::new(Classes::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Classes::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_class_per_section_per_year")
                    .table(Classes::Table)
                    .col(Classes::Name)
                    .col(Classes::Section)
                    .col(Classes::AcademicYear)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subjects::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Subjects::Name).string().not_null())
                    .col(
                        ColumnDef::new(Subjects::Code)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Subjects::Description).text().null())
                    .col(
                        ColumnDef::new(Subjects::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Subjects::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================
        // PEOPLE TABLES
        // ============================================

        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(
                        ColumnDef::new(Students::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Students::StudentNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::ClassId).uuid().null())
                    .col(
                        ColumnDef::new(Students::Status)
                            .enumeration(
                                StudentStatus::Table,
                                [
                                    StudentStatus::Active,
                                    StudentStatus::Inactive,
                                    StudentStatus::Graduated,
                                    StudentStatus::Transferred,
                                ],
                            )
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Students::AdmissionDate)
                            .date()
                            .not_null()
                            .extra("DEFAULT CURRENT_DATE".to_string()),
                    )
                    .col(ColumnDef::new(Students::DateOfBirth).date().null())
                    .col(ColumnDef::new(Students::Gender).string_len(16).null())
                    .col(ColumnDef::new(Students::GuardianName).string().null())
                    .col(ColumnDef::new(Students::GuardianPhone).string_len(32).null())
                    .col(ColumnDef::new(Students::GuardianEmail).string().null())
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Students::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_profile")
                            .from_tbl(Students::Table)
                            .from_col(Students::UserId)
                            .to_tbl(Profiles::Table)
                            .to_col(Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_class")
                            .from_tbl(Students::Table)
                            .from_col(Students::ClassId)
                            .to_tbl(Classes::Table)
                            .to_col(Classes::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_students_class_id")
                    .table(Students::Table)
                    .col(Students::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_students_status")
                    .table(Students::Table)
                    .col(Students::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teachers::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(
                        ColumnDef::new(Teachers::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Teachers::EmployeeNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Teachers::Status)
                            .enumeration(
                                EmploymentStatus::Table,
                                [
                                    EmploymentStatus::Active,
                                    EmploymentStatus::OnLeave,
                                    EmploymentStatus::Terminated,
                                ],
                            )
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Teachers::HireDate)
                            .date()
                            .not_null()
                            .extra("DEFAULT CURRENT_DATE".to_string()),
                    )
                    .col(ColumnDef::new(Teachers::Department).string().null())
                    .col(ColumnDef::new(Teachers::Qualifications).text().null())
                    .col(
                        ColumnDef::new(Teachers::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Teachers::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teachers_profile")
                            .from_tbl(Teachers::Table)
                            .from_col(Teachers::UserId)
                            .to_tbl(Profiles::Table)
                            .to_col(Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teachers_department")
                    .table(Teachers::Table)
                    .col(Teachers::Department)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeacherSubjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeacherSubjects::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(TeacherSubjects::TeacherId).uuid().not_null())
                    .col(ColumnDef::new(TeacherSubjects::SubjectId).uuid().not_null())
                    .col(ColumnDef::new(TeacherSubjects::ClassId).uuid().not_null())
                    .col(
                        ColumnDef::new(TeacherSubjects::AcademicYear)
                            .string_len(9)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeacherSubjects::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teacher_subjects_teacher")
                            .from_tbl(TeacherSubjects::Table)
                            .from_col(TeacherSubjects::TeacherId)
                            .to_tbl(Teachers::Table)
                            .to_col(Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teacher_subjects_subject")
                            .from_tbl(TeacherSubjects::Table)
                            .from_col(TeacherSubjects::SubjectId)
                            .to_tbl(Subjects::Table)
                            .to_col(Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teacher_subjects_class")
                            .from_tbl(TeacherSubjects::Table)
                            .from_col(TeacherSubjects::ClassId)
                            .to_tbl(Classes::Table)
                            .to_col(Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_teacher_subject_class_year")
                    .table(TeacherSubjects::Table)
                    .col(TeacherSubjects::TeacherId)
                    .col(TeacherSubjects::SubjectId)
                    .col(TeacherSubjects::ClassId)
                    .col(TeacherSubjects::AcademicYear)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teacher_subjects_teacher_id")
                    .table(TeacherSubjects::Table)
                    .col(TeacherSubjects::TeacherId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teacher_subjects_class_id")
                    .table(TeacherSubjects::Table)
                    .col(TeacherSubjects::ClassId)
                    .to_owned(),
            )
            .await?;

        // ============================================
        // STORAGE METADATA
        // ============================================

        manager
            .create_table(
                Table::create()
                    .table(StorageObjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StorageObjects::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(StorageObjects::Bucket).string_len(63).not_null())
                    .col(ColumnDef::new(StorageObjects::Name).text().not_null())
                    .col(ColumnDef::new(StorageObjects::OwnerId).uuid().null())
                    .col(
                        ColumnDef::new(StorageObjects::ContentType)
                            .string()
                            .not_null()
                            .default("application/octet-stream"),
                    )
                    .col(
                        ColumnDef::new(StorageObjects::SizeBytes)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StorageObjects::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(StorageObjects::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_storage_objects_owner")
                            .from_tbl(StorageObjects::Table)
                            .from_col(StorageObjects::OwnerId)
                            .to_tbl(Profiles::Table)
                            .to_col(Profiles::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_storage_object_per_bucket")
                    .table(StorageObjects::Table)
                    .col(StorageObjects::Bucket)
                    .col(StorageObjects::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_storage_objects_owner_id")
                    .table(StorageObjects::Table)
                    .col(StorageObjects::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StorageObjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeacherSubjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthIdentities::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(EmploymentStatus::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(StudentStatus::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(UserRole::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserRole {
    Table,
    Admin,
    Teacher,
    Student,
    Parent,
}

#[derive(DeriveIden)]
enum StudentStatus {
    Table,
    Active,
    Inactive,
    Graduated,
    Transferred,
}

#[derive(DeriveIden)]
enum EmploymentStatus {
    Table,
    Active,
    OnLeave,
    Terminated,
}

#[derive(DeriveIden)]
enum AuthIdentities {
    Table,
    Id,
    Email,
    EncryptedPassword,
    RawUserMetaData,
    LastSignInAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    Role,
    Phone,
    Address,
    AvatarUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Classes {
    Table,
    Id,
    Name,
    Level,
    Section,
    AcademicYear,
    Capacity,
    RoomNumber,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subjects {
    Table,
    Id,
    Name,
    Code,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    UserId,
    StudentNumber,
    ClassId,
    Status,
    AdmissionDate,
    DateOfBirth,
    Gender,
    GuardianName,
    GuardianPhone,
    GuardianEmail,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Teachers {
    Table,
    Id,
    UserId,
    EmployeeNumber,
    Status,
    HireDate,
    Department,
    Qualifications,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeacherSubjects {
    Table,
    Id,
    TeacherId,
    SubjectId,
    ClassId,
    AcademicYear,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StorageObjects {
    Table,
    Id,
    Bucket,
    Name,
    OwnerId,
    ContentType,
    SizeBytes,
    CreatedAt,
    UpdatedAt,
}
