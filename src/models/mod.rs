pub mod issue;
pub mod user;

pub use issue::{Issue, IssueDraft, Priority, State};
pub use user::User;
