pub mod class_repository;
pub mod identity_repository;
pub mod profile_repository;
pub mod storage_object_repository;
pub mod student_repository;
pub mod subject_repository;
pub mod teacher_repository;
pub mod teacher_subject_repository;

pub use class_repository::{ClassRepository, ClassUpdate, NewClass};
pub use identity_repository::IdentityRepository;
pub use profile_repository::{ProfileRepository, ProfileUpdate};
pub use storage_object_repository::StorageObjectRepository;
pub use student_repository::{NewStudent, StudentFilter, StudentRecord, StudentRepository, StudentUpdate};
pub use subject_repository::{NewSubject, SubjectRepository, SubjectUpdate};
pub use teacher_repository::{NewTeacher, TeacherFilter, TeacherRecord, TeacherRepository, TeacherUpdate};
pub use teacher_subject_repository::{
    AssignmentFilter, AssignmentRecord, NewAssignment, TeacherSubjectRepository,
};
