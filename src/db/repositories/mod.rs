pub mod acronym;
pub mod category;
pub mod password_reset;
pub mod token;
pub mod user;
