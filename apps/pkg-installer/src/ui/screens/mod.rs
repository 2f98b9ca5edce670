pub mod home;
pub mod picker;
