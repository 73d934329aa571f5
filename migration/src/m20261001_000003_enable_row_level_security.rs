use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SECURED_TABLES: [&str; 7] = [
    "profiles",
    "classes",
    "subjects",
    "students",
    "teachers",
    "teacher_subjects",
    "storage_objects",
];

/// (policy name, table, statement tail)
const POLICIES: [(&str, &str, &str); 19] = [
    // profiles: own row or admin
    (
        "profiles_select_own_or_admin",
        "profiles",
        "FOR SELECT USING (id = app_current_user_id() OR app_is_admin())",
    ),
    (
        "profiles_update_own_or_admin",
        "profiles",
        "FOR UPDATE USING (id = app_current_user_id() OR app_is_admin()) \
         WITH CHECK (app_is_admin() OR (id = app_current_user_id() AND role = app_current_role()))",
    ),
    (
        "profiles_insert_admin",
        "profiles",
        "FOR INSERT WITH CHECK (app_is_admin())",
    ),
    (
        "profiles_delete_admin",
        "profiles",
        "FOR DELETE USING (app_is_admin())",
    ),
    // students: own row or admin, writes by admin
    (
        "students_select_own_or_admin",
        "students",
        "FOR SELECT USING (user_id = app_current_user_id() OR app_is_admin())",
    ),
    (
        "students_insert_admin",
        "students",
        "FOR INSERT WITH CHECK (app_is_admin())",
    ),
    (
        "students_update_admin",
        "students",
        "FOR UPDATE USING (app_is_admin()) WITH CHECK (app_is_admin())",
    ),
    (
        "students_delete_admin",
        "students",
        "FOR DELETE USING (app_is_admin())",
    ),
    // teachers: own row or admin, writes by admin
    (
        "teachers_select_own_or_admin",
        "teachers",
        "FOR SELECT USING (user_id = app_current_user_id() OR app_is_admin())",
    ),
    (
        "teachers_write_admin",
        "teachers",
        "FOR ALL USING (app_is_admin()) WITH CHECK (app_is_admin())",
    ),
    // reference data: readable by any signed-in identity
    (
        "classes_select_authenticated",
        "classes",
        "FOR SELECT USING (app_current_user_id() IS NOT NULL)",
    ),
    (
        "classes_write_admin",
        "classes",
        "FOR ALL USING (app_is_admin()) WITH CHECK (app_is_admin())",
    ),
    (
        "subjects_select_authenticated",
        "subjects",
        "FOR SELECT USING (app_current_user_id() IS NOT NULL)",
    ),
    (
        "subjects_write_admin",
        "subjects",
        "FOR ALL USING (app_is_admin()) WITH CHECK (app_is_admin())",
    ),
    (
        "teacher_subjects_select_authenticated",
        "teacher_subjects",
        "FOR SELECT USING (app_current_user_id() IS NOT NULL)",
    ),
    (
        "teacher_subjects_write_admin",
        "teacher_subjects",
        "FOR ALL USING (app_is_admin()) WITH CHECK (app_is_admin())",
    ),
    // storage metadata
    (
        "storage_objects_select_authenticated",
        "storage_objects",
        "FOR SELECT USING (app_current_user_id() IS NOT NULL)",
    ),
    (
        "storage_objects_insert_owner",
        "storage_objects",
        "FOR INSERT WITH CHECK (owner_id = app_current_user_id())",
    ),
    (
        "storage_objects_modify_owner_or_admin",
        "storage_objects",
        "FOR ALL USING (owner_id = app_current_user_id() OR app_is_admin()) \
         WITH CHECK (owner_id = app_current_user_id() OR app_is_admin())",
    ),
];

/// Role the service may switch to per transaction so policies apply even
/// when it connects as the table owner. Creation is skipped when the
/// migrating user lacks CREATEROLE.
const CREATE_SESSION_ROLE: &str = r#"
DO $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = 'school_app') THEN
        CREATE ROLE school_app NOLOGIN;
    END IF;
    GRANT school_app TO CURRENT_USER;
EXCEPTION WHEN insufficient_privilege THEN
    RAISE NOTICE 'school_app role not created: %', SQLERRM;
END
$$
"#;

const GRANT_SESSION_ROLE: &str = r#"
DO $$
BEGIN
    IF EXISTS (SELECT 1 FROM pg_roles WHERE rolname = 'school_app') THEN
        GRANT USAGE ON SCHEMA public TO school_app;
        GRANT SELECT, INSERT, UPDATE, DELETE
            ON auth_identities, profiles, classes, subjects, students, teachers, teacher_subjects, storage_objects
            TO school_app;
    END IF;
END
$$
"#;

const REVOKE_SESSION_ROLE: &str = r#"
DO $$
BEGIN
    IF EXISTS (SELECT 1 FROM pg_roles WHERE rolname = 'school_app') THEN
        REVOKE SELECT, INSERT, UPDATE, DELETE
            ON auth_identities, profiles, classes, subjects, students, teachers, teacher_subjects, storage_objects
            FROM school_app;
    END IF;
END
$$
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in SECURED_TABLES {
            db.execute_unprepared(&format!("ALTER TABLE {table} ENABLE ROW LEVEL SECURITY"))
                .await?;
        }

        for (name, table, rule) in POLICIES {
            db.execute_unprepared(&format!("CREATE POLICY {name} ON {table} {rule}"))
                .await?;
        }

        db.execute_unprepared(CREATE_SESSION_ROLE).await?;
        db.execute_unprepared(GRANT_SESSION_ROLE).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(REVOKE_SESSION_ROLE).await?;

        for (name, table, _) in POLICIES {
            db.execute_unprepared(&format!("DROP POLICY IF EXISTS {name} ON {table}"))
                .await?;
        }

        for table in SECURED_TABLES {
            db.execute_unprepared(&format!("ALTER TABLE {table} DISABLE ROW LEVEL SECURITY"))
                .await?;
        }

        Ok(())
    }
}
