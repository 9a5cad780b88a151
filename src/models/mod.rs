pub mod attachment;
pub mod course;
pub mod feedback;
pub mod loaders;
pub mod submission;
pub mod teacher;
pub mod user;

pub use attachment::{Attachment, DriveFile, Form, Link, SharedDriveFile, YouTubeVideo};
pub use course::{Course, CourseWork, CourseWorkState, CourseWorkType};
pub use feedback::FeedbackResult;
pub use loaders::load_teacher_profile;
pub use submission::{Submission, SubmissionContent, SubmissionState};
pub use teacher::TeacherProfile;
pub use user::UserProfile;
