mod check_config;
mod create_user;

pub use check_config::cmd_check_config;
pub use create_user::{CreateUserArgs, cmd_create_user};
