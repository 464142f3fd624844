pub mod home;
pub mod projects;
pub mod system;
pub mod uploads;
