pub mod prelude;

pub mod acronym_category_pivot;
pub mod acronyms;
pub mod categories;
pub mod password_reset_tokens;
pub mod tokens;
pub mod users;
