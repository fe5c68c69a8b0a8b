mod attendee;
mod deliverable;
mod draft;
mod event;
mod submission;
mod team;
mod user;

pub mod types;

pub use attendee::{Attendee, AttendeeStatus};
pub use deliverable::{DeliverableFlag, SubmissionStatus};
pub use draft::{Draft, DraftKey};
pub use event::{Event, EventId, SubmissionWindow};
pub use submission::{Deliverable, DeliverableFile, SubmissionRecord, SubmittedFile};
pub use team::{Team, TeamMember, TeamMemberUser};
pub use user::{NewUser, User, UserId, UserPatch};
