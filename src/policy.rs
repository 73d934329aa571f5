//! Row access rules, mirrored from the row-level-security policies created
//! by the migration. Handlers check these before touching the database so a
//! forbidden call fails with 403 instead of an empty result.

use uuid::Uuid;

use crate::auth::TokenClaims;
use crate::entities::sea_orm_active_enums::UserRole;
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Profiles,
    Students,
    Teachers,
    Classes,
    Subjects,
    TeacherSubjects,
    StorageObjects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

/// The identity a request acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    fn owns(&self, owner: Option<Uuid>) -> bool {
        owner == Some(self.user_id)
    }
}

impl From<&TokenClaims> for Actor {
    fn from(claims: &TokenClaims) -> Self {
        Actor::new(claims.user_id, claims.role)
    }
}

/// `owner` is the identity the row belongs to (`profiles.id`,
/// `students.user_id`, `teachers.user_id`, `storage_objects.owner_id`), or
/// `None` when the row is not known yet, e.g. for list queries.
pub fn allows(actor: &Actor, table: Table, op: Operation, owner: Option<Uuid>) -> bool {
    if actor.is_admin() {
        return true;
    }

    match (table, op) {
        (Table::Profiles, Operation::Select | Operation::Update) => actor.owns(owner),
        (Table::Students | Table::Teachers, Operation::Select) => actor.owns(owner),
        (Table::Classes | Table::Subjects | Table::TeacherSubjects, Operation::Select) => true,
        (Table::StorageObjects, Operation::Select) => true,
        (Table::StorageObjects, Operation::Insert | Operation::Update | Operation::Delete) => {
            actor.owns(owner)
        }
        _ => false,
    }
}

/// Like [`allows`] but yields a `Forbidden` error naming the denied action.
pub fn ensure(actor: &Actor, table: Table, op: Operation, owner: Option<Uuid>) -> ServiceResult<()> {
    if allows(actor, table, op, owner) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "{} may not {:?} {:?}",
            actor.role, op, table
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole) -> Actor {
        Actor::new(Uuid::new_v4(), role)
    }

    #[test]
    fn admin_may_do_anything() {
        let admin = actor(UserRole::Admin);
        let other = Some(Uuid::new_v4());
        for table in [
            Table::Profiles,
            Table::Students,
            Table::Teachers,
            Table::Classes,
            Table::Subjects,
            Table::TeacherSubjects,
            Table::StorageObjects,
        ] {
            for op in [
                Operation::Select,
                Operation::Insert,
                Operation::Update,
                Operation::Delete,
            ] {
                assert!(allows(&admin, table, op, other), "{table:?} {op:?}");
            }
        }
    }

    #[test]
    fn non_admin_reads_only_own_profile() {
        for role in [UserRole::Teacher, UserRole::Student, UserRole::Parent] {
            let me = actor(role);
            assert!(allows(&me, Table::Profiles, Operation::Select, Some(me.user_id)));
            assert!(allows(&me, Table::Profiles, Operation::Update, Some(me.user_id)));
            assert!(!allows(&me, Table::Profiles, Operation::Select, Some(Uuid::new_v4())));
            assert!(!allows(&me, Table::Profiles, Operation::Select, None));
            assert!(!allows(&me, Table::Profiles, Operation::Delete, Some(me.user_id)));
        }
    }

    #[test]
    fn people_rows_are_written_by_admin_only() {
        let teacher = actor(UserRole::Teacher);
        for table in [Table::Students, Table::Teachers] {
            assert!(allows(&teacher, table, Operation::Select, Some(teacher.user_id)));
            assert!(!allows(&teacher, table, Operation::Select, Some(Uuid::new_v4())));
            assert!(!allows(&teacher, table, Operation::Insert, Some(teacher.user_id)));
            assert!(!allows(&teacher, table, Operation::Update, Some(teacher.user_id)));
            assert!(!allows(&teacher, table, Operation::Delete, Some(teacher.user_id)));
        }
    }

    #[test]
    fn reference_data_is_readable_by_everyone_signed_in() {
        let student = actor(UserRole::Student);
        for table in [Table::Classes, Table::Subjects, Table::TeacherSubjects] {
            assert!(allows(&student, table, Operation::Select, None));
            assert!(!allows(&student, table, Operation::Insert, None));
            assert!(!allows(&student, table, Operation::Delete, None));
        }
    }

    #[test]
    fn storage_objects_are_managed_by_their_owner() {
        let parent = actor(UserRole::Parent);
        assert!(allows(&parent, Table::StorageObjects, Operation::Select, None));
        assert!(allows(&parent, Table::StorageObjects, Operation::Insert, Some(parent.user_id)));
        assert!(allows(&parent, Table::StorageObjects, Operation::Delete, Some(parent.user_id)));
        assert!(!allows(&parent, Table::StorageObjects, Operation::Delete, Some(Uuid::new_v4())));
        assert!(!allows(&parent, Table::StorageObjects, Operation::Update, None));
    }

    #[test]
    fn ensure_reports_forbidden() {
        let student = actor(UserRole::Student);
        let err = ensure(&student, Table::Classes, Operation::Delete, None).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(ensure(&student, Table::Classes, Operation::Select, None).is_ok());
    }
}
