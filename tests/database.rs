//! Runs against a real Postgres when `TEST_DATABASE_URL` is set; otherwise
//! every scenario returns early.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use school_admin::auth::{NewAccount, create_account, verify_credentials};
use school_admin::database::{begin_scoped, get_database_connection};
use school_admin::entities::sea_orm_active_enums::{EmploymentStatus, StudentStatus, UserRole};
use school_admin::errors::ServiceError;
use school_admin::policy::Actor;
use school_admin::repositories::{
    ClassRepository, IdentityRepository, NewAssignment, NewClass, NewStudent, NewSubject,
    NewTeacher, ProfileRepository, StorageObjectRepository, StudentFilter, StudentRepository,
    SubjectRepository, TeacherFilter, TeacherRepository, TeacherSubjectRepository,
};
use school_admin::storage::ObjectKey;
use school_admin::utils::random::generate_random_string;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use uuid::Uuid;

async fn connect() -> Option<DatabaseConnection> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let db = get_database_connection(&url).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Some(db)
}

fn account(role: UserRole) -> NewAccount {
    NewAccount {
        email: format!("{}@school.test", generate_random_string(10).to_lowercase()),
        password: "secret123".to_string(),
        first_name: "Test".to_string(),
        last_name: role.as_str().to_string(),
        role,
    }
}

async fn new_class(db: &DatabaseConnection) -> Uuid {
    ClassRepository::new(db)
        .create(NewClass {
            name: format!("Grade {}", generate_random_string(6)),
            level: 7,
            section: "A".to_string(),
            academic_year: "2026-2027".to_string(),
            capacity: 30,
            room_number: None,
        })
        .await
        .unwrap()
        .id
}

async fn new_student(db: &DatabaseConnection, user_id: Uuid, class_id: Option<Uuid>) -> Uuid {
    StudentRepository::new(db)
        .create(NewStudent {
            user_id,
            student_number: format!("STU-TEST-{}", generate_random_string(8)),
            class_id,
            status: StudentStatus::Active,
            admission_date: Utc::now().date_naive(),
            date_of_birth: None,
            gender: None,
            guardian_name: None,
            guardian_phone: None,
            guardian_email: None,
        })
        .await
        .unwrap()
        .id
}

// Migrations must not run concurrently, so scenarios share one test.
#[tokio::test]
async fn database_scenarios() {
    let Some(db) = connect().await else {
        return;
    };

    profile_is_created_from_identity_metadata(&db).await;
    wrong_password_is_unauthorized(&db).await;
    deleting_a_class_keeps_its_students(&db).await;
    duplicate_assignment_is_a_conflict(&db).await;
    deleting_an_identity_cascades(&db).await;
    student_filter_selects_one_identity(&db).await;

    if session_role_exists(&db).await {
        row_level_security_hides_other_profiles(&db).await;
        student_sees_only_its_own_student_row(&db).await;
        teacher_sees_only_its_own_teacher_row(&db).await;
        non_admin_cannot_insert_students(&db).await;
        only_the_owner_deletes_a_storage_object(&db).await;
    }
}

async fn session_role_exists(db: &DatabaseConnection) -> bool {
    db.query_one(Statement::from_string(
        DbBackend::Postgres,
        "SELECT 1 FROM pg_roles WHERE rolname = 'school_app'",
    ))
    .await
    .unwrap()
    .is_some()
}

async fn new_teacher(db: &DatabaseConnection, user_id: Uuid) -> Uuid {
    TeacherRepository::new(db)
        .create(NewTeacher {
            user_id,
            employee_number: format!("EMP-TEST-{}", generate_random_string(8)),
            status: EmploymentStatus::Active,
            hire_date: Utc::now().date_naive(),
            department: Some("Science".to_string()),
            qualifications: None,
        })
        .await
        .unwrap()
        .id
}

async fn profile_is_created_from_identity_metadata(db: &DatabaseConnection) {
    let new_account = account(UserRole::Teacher);
    let email = new_account.email.clone();

    let profile = create_account(db, new_account).await.unwrap();

    assert_eq!(profile.email, email);
    assert_eq!(profile.role, UserRole::Teacher);
    assert_eq!(profile.first_name, "Test");
    assert_eq!(profile.last_name, "teacher");

    let duplicate = NewAccount {
        email: email.to_uppercase(),
        ..account(UserRole::Student)
    };
    assert!(matches!(
        create_account(db, duplicate).await,
        Err(ServiceError::Conflict(_))
    ));
}

async fn wrong_password_is_unauthorized(db: &DatabaseConnection) {
    let new_account = account(UserRole::Parent);
    let email = new_account.email.clone();
    create_account(db, new_account).await.unwrap();

    let (_, profile) = verify_credentials(db, &email, "secret123").await.unwrap();
    assert_eq!(profile.role, UserRole::Parent);

    assert!(matches!(
        verify_credentials(db, &email, "wrong-password").await,
        Err(ServiceError::Unauthorized(_))
    ));
    assert!(matches!(
        verify_credentials(db, "nobody@school.test", "secret123").await,
        Err(ServiceError::Unauthorized(_))
    ));
}

async fn deleting_a_class_keeps_its_students(db: &DatabaseConnection) {
    let profile = create_account(db, account(UserRole::Student)).await.unwrap();
    let class_id = new_class(db).await;
    let student_id = new_student(db, profile.id, Some(class_id)).await;

    ClassRepository::new(db).delete(class_id).await.unwrap();

    let record = StudentRepository::new(db)
        .find_by_id(student_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.student.class_id, None);
    assert!(record.class.is_none());
}

async fn duplicate_assignment_is_a_conflict(db: &DatabaseConnection) {
    let profile = create_account(db, account(UserRole::Teacher)).await.unwrap();
    let teacher_id = new_teacher(db, profile.id).await;
    let subject = SubjectRepository::new(db)
        .create(NewSubject {
            name: "Chemistry".to_string(),
            code: format!("CH{}", generate_random_string(6)),
            description: None,
        })
        .await
        .unwrap();
    let class_id = new_class(db).await;

    let assignment = || NewAssignment {
        teacher_id,
        subject_id: subject.id,
        class_id,
        academic_year: "2026-2027".to_string(),
    };

    let repository = TeacherSubjectRepository::new(db);
    repository.create(assignment()).await.unwrap();
    assert!(matches!(
        repository.create(assignment()).await,
        Err(ServiceError::Conflict(_))
    ));
}

async fn deleting_an_identity_cascades(db: &DatabaseConnection) {
    let profile = create_account(db, account(UserRole::Student)).await.unwrap();
    let student_id = new_student(db, profile.id, None).await;

    IdentityRepository::new(db).delete(profile.id).await.unwrap();

    assert!(ProfileRepository::new(db).find_by_id(profile.id).await.unwrap().is_none());
    assert!(StudentRepository::new(db).find_by_id(student_id).await.unwrap().is_none());
    assert!(matches!(
        IdentityRepository::new(db).delete(profile.id).await,
        Err(ServiceError::NotFound("Identity"))
    ));
}

async fn row_level_security_hides_other_profiles(db: &DatabaseConnection) {
    let me = create_account(db, account(UserRole::Student)).await.unwrap();
    let other = create_account(db, account(UserRole::Student)).await.unwrap();
    let actor = Actor::new(me.id, me.role);

    let txn = begin_scoped(db, &actor, Some("school_app")).await.unwrap();
    let profiles = ProfileRepository::new(&txn);
    assert!(profiles.find_by_id(me.id).await.unwrap().is_some());
    assert!(profiles.find_by_id(other.id).await.unwrap().is_none());
    txn.rollback().await.unwrap();
}

async fn student_filter_selects_one_identity(db: &DatabaseConnection) {
    let me = create_account(db, account(UserRole::Student)).await.unwrap();
    let other = create_account(db, account(UserRole::Student)).await.unwrap();
    let my_student_id = new_student(db, me.id, None).await;
    new_student(db, other.id, None).await;

    let rows = StudentRepository::new(db)
        .find_all(StudentFilter {
            user_id: Some(me.id),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].student.id, my_student_id);
}

async fn student_sees_only_its_own_student_row(db: &DatabaseConnection) {
    let me = create_account(db, account(UserRole::Student)).await.unwrap();
    let other = create_account(db, account(UserRole::Student)).await.unwrap();
    let my_student_id = new_student(db, me.id, None).await;
    let other_student_id = new_student(db, other.id, None).await;

    let txn = begin_scoped(db, &Actor::new(me.id, me.role), Some("school_app"))
        .await
        .unwrap();
    let students = StudentRepository::new(&txn);

    let visible = students.find_all(StudentFilter::default()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].student.id, my_student_id);
    assert!(students.find_by_id(other_student_id).await.unwrap().is_none());
    txn.rollback().await.unwrap();
}

async fn teacher_sees_only_its_own_teacher_row(db: &DatabaseConnection) {
    let me = create_account(db, account(UserRole::Teacher)).await.unwrap();
    let other = create_account(db, account(UserRole::Teacher)).await.unwrap();
    let my_teacher_id = new_teacher(db, me.id).await;
    let other_teacher_id = new_teacher(db, other.id).await;

    let txn = begin_scoped(db, &Actor::new(me.id, me.role), Some("school_app"))
        .await
        .unwrap();
    let teachers = TeacherRepository::new(&txn);

    let visible = teachers.find_all(TeacherFilter::default()).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].teacher.id, my_teacher_id);
    assert!(teachers.find_by_id(other_teacher_id).await.unwrap().is_none());
    txn.rollback().await.unwrap();
}

async fn non_admin_cannot_insert_students(db: &DatabaseConnection) {
    let me = create_account(db, account(UserRole::Teacher)).await.unwrap();

    let txn = begin_scoped(db, &Actor::new(me.id, me.role), Some("school_app"))
        .await
        .unwrap();
    let result = StudentRepository::new(&txn)
        .create(NewStudent {
            user_id: me.id,
            student_number: format!("STU-TEST-{}", generate_random_string(8)),
            class_id: None,
            status: StudentStatus::Active,
            admission_date: Utc::now().date_naive(),
            date_of_birth: None,
            gender: None,
            guardian_name: None,
            guardian_phone: None,
            guardian_email: None,
        })
        .await;

    assert!(matches!(result, Err(ServiceError::Forbidden(_))), "{result:?}");
    txn.rollback().await.unwrap();
}

async fn only_the_owner_deletes_a_storage_object(db: &DatabaseConnection) {
    let owner = create_account(db, account(UserRole::Parent)).await.unwrap();
    let stranger = create_account(db, account(UserRole::Parent)).await.unwrap();
    let key = ObjectKey {
        bucket: "documents".to_string(),
        name: format!("tests/{}.txt", generate_random_string(8)),
    };
    StorageObjectRepository::new(db)
        .upsert(&key, owner.id, "text/plain", 5)
        .await
        .unwrap();

    let txn = begin_scoped(db, &Actor::new(stranger.id, stranger.role), Some("school_app"))
        .await
        .unwrap();
    let objects = StorageObjectRepository::new(&txn);
    assert!(objects.find(&key).await.unwrap().is_some());
    assert!(!objects.delete(&key).await.unwrap());
    txn.commit().await.unwrap();
    assert!(StorageObjectRepository::new(db).find(&key).await.unwrap().is_some());

    let txn = begin_scoped(db, &Actor::new(owner.id, owner.role), Some("school_app"))
        .await
        .unwrap();
    assert!(StorageObjectRepository::new(&txn).delete(&key).await.unwrap());
    txn.commit().await.unwrap();
}
