pub mod acronym_service;
pub mod acronym_service_impl;
pub use acronym_service::{AcronymError, AcronymService};
pub use acronym_service_impl::SeaOrmAcronymService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AccessToken, AuthError, AuthService};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod password_reset;
pub mod password_reset_impl;
pub use password_reset::{PasswordResetService, ResetError, ResetRequestOutcome};
pub use password_reset_impl::SeaOrmPasswordResetService;

pub mod profile_picture;
pub use profile_picture::{PictureError, ProfilePictureStore};
