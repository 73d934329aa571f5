use anyhow::Context;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbBackend,
    DbErr, Statement, TransactionTrait,
};
use std::time::Duration;

use crate::policy::Actor;

pub async fn get_database_connection(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Database connection established");
    Ok(db)
}

/// Accepts plain lower-case SQL identifiers only, since a role name cannot be
/// bound as a parameter of `SET ROLE`.
pub fn is_valid_role_name(role: &str) -> bool {
    let mut chars = role.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && role.len() <= 63
}

/// Binds `actor` to the current transaction so row-level-security policies
/// see it through `app_current_user_id()`. Optionally drops to
/// `session_role` for the rest of the transaction.
pub async fn apply_scope<C>(conn: &C, actor: &Actor, session_role: Option<&str>) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if let Some(role) = session_role {
        if !is_valid_role_name(role) {
            return Err(DbErr::Custom(format!("Invalid session role name: {role}")));
        }
        conn.execute_unprepared(&format!("SET LOCAL ROLE \"{role}\""))
            .await?;
    }

    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT set_config('app.current_user_id', $1, true)",
        [actor.user_id.to_string().into()],
    ))
    .await?;

    Ok(())
}

pub async fn begin_scoped(
    db: &DatabaseConnection,
    actor: &Actor,
    session_role: Option<&str>,
) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;
    apply_scope(&txn, actor, session_role).await?;
    Ok(txn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_role_names() {
        assert!(is_valid_role_name("school_app"));
        assert!(is_valid_role_name("_svc2"));
    }

    #[test]
    fn rejects_role_names_needing_quotes() {
        assert!(!is_valid_role_name(""));
        assert!(!is_valid_role_name("2fast"));
        assert!(!is_valid_role_name("School"));
        assert!(!is_valid_role_name("app\"; DROP TABLE students; --"));
        assert!(!is_valid_role_name(&"a".repeat(64)));
    }
}
