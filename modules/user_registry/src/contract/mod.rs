pub mod model;

pub use model::{NewUser, UpdateSummary, User, UserFilter, UserPatch};
