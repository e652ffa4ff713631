pub mod managers;
pub mod users;
