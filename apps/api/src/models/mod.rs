pub mod company;
pub mod resume;
pub mod user;
