pub mod list;
pub mod user;

pub use list::{Activity, ActivityAction, Checklist, ChecklistInput, List, Step, Task};
pub use user::{Authorization, OAuthAccounts, User, UserView};
