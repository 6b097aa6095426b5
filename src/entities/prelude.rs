pub use super::acronym_category_pivot::Entity as AcronymCategoryPivot;
pub use super::acronyms::Entity as Acronyms;
pub use super::categories::Entity as Categories;
pub use super::password_reset_tokens::Entity as PasswordResetTokens;
pub use super::tokens::Entity as Tokens;
pub use super::users::Entity as Users;
