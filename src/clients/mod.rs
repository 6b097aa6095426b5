pub mod github;
pub mod google;
pub mod mailer;
pub mod oauth;
