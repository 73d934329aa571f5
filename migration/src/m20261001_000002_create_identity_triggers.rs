use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Tables carrying an `updated_at` column maintained by `set_updated_at()`.
const TIMESTAMPED_TABLES: [&str; 7] = [
    "auth_identities",
    "profiles",
    "classes",
    "subjects",
    "students",
    "teachers",
    "storage_objects",
];

const CREATE_FUNCTIONS: [&str; 5] = [
    r#"
    CREATE OR REPLACE FUNCTION app_current_user_id() RETURNS uuid
    LANGUAGE sql STABLE AS $$
        SELECT NULLIF(current_setting('app.current_user_id', true), '')::uuid
    $$
    "#,
    r#"
    CREATE OR REPLACE FUNCTION app_current_role() RETURNS user_role
    LANGUAGE sql STABLE SECURITY DEFINER SET search_path = public AS $$
        SELECT role FROM profiles WHERE id = app_current_user_id()
    $$
    "#,
    r#"
    CREATE OR REPLACE FUNCTION app_is_admin() RETURNS boolean
    LANGUAGE sql STABLE SECURITY DEFINER SET search_path = public AS $$
        SELECT EXISTS (
            SELECT 1 FROM profiles
            WHERE id = app_current_user_id() AND role = 'admin'
        )
    $$
    "#,
    r#"
    CREATE OR REPLACE FUNCTION handle_new_identity() RETURNS trigger
    LANGUAGE plpgsql SECURITY DEFINER SET search_path = public AS $$
    BEGIN
        INSERT INTO profiles (id, email, first_name, last_name, role)
        VALUES (
            NEW.id,
            NEW.email,
            COALESCE(NEW.raw_user_meta_data ->> 'first_name', ''),
            COALESCE(NEW.raw_user_meta_data ->> 'last_name', ''),
            COALESCE((NEW.raw_user_meta_data ->> 'role')::user_role, 'student')
        );
        RETURN NEW;
    END;
    $$
    "#,
    r#"
    CREATE OR REPLACE FUNCTION set_updated_at() RETURNS trigger
    LANGUAGE plpgsql AS $$
    BEGIN
        NEW.updated_at = CURRENT_TIMESTAMP;
        RETURN NEW;
    END;
    $$
    "#,
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for statement in CREATE_FUNCTIONS {
            db.execute_unprepared(statement).await?;
        }

        // Every new identity gets a profile row in the same transaction
        db.execute_unprepared(
            "CREATE TRIGGER on_identity_created \
             AFTER INSERT ON auth_identities \
             FOR EACH ROW EXECUTE FUNCTION handle_new_identity()",
        )
        .await?;

        for table in TIMESTAMPED_TABLES {
            db.execute_unprepared(&format!(
                "CREATE TRIGGER set_{table}_updated_at \
                 BEFORE UPDATE ON {table} \
                 FOR EACH ROW EXECUTE FUNCTION set_updated_at()"
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in TIMESTAMPED_TABLES {
            db.execute_unprepared(&format!(
                "DROP TRIGGER IF EXISTS set_{table}_updated_at ON {table}"
            ))
            .await?;
        }

        db.execute_unprepared("DROP TRIGGER IF EXISTS on_identity_created ON auth_identities")
            .await?;

        for function in [
            "set_updated_at()",
            "handle_new_identity()",
            "app_is_admin()",
            "app_current_role()",
            "app_current_user_id()",
        ] {
            db.execute_unprepared(&format!("DROP FUNCTION IF EXISTS {function}"))
                .await?;
        }

        Ok(())
    }
}
