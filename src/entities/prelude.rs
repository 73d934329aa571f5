pub use super::auth_identity::Entity as AuthIdentity;
pub use super::class::Entity as Class;
pub use super::profile::Entity as Profile;
pub use super::storage_object::Entity as StorageObject;
pub use super::student::Entity as Student;
pub use super::subject::Entity as Subject;
pub use super::teacher::Entity as Teacher;
pub use super::teacher_subject::Entity as TeacherSubject;
