use regex::Regex;
use std::sync::OnceLock;

use super::ApiError;

/// Fields submitted on the registration form.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub email: &'a str,
}

pub fn validate_name(name: &str) -> Result<&str, ApiError> {
    if name.is_empty() || !name.is_ascii() {
        return Err(ApiError::validation(
            "Name must be non-empty and contain only ASCII characters",
        ));
    }
    Ok(name)
}

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    if username.len() < 3 || !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::validation(
            "Username must be at least 3 characters and contain only letters and numbers",
        ));
    }
    Ok(username)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.chars().count() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }
    Ok(password)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("Invalid regex")
    });

    if !re.is_match(email) {
        return Err(ApiError::validation("Email address is not valid"));
    }
    Ok(email)
}

pub fn validate_registration(form: &Registration<'_>) -> Result<(), ApiError> {
    validate_name(form.name)?;
    validate_username(form.username)?;
    validate_password(form.password)?;
    validate_email(form.email)?;

    if form.password != form.confirm_password {
        return Err(ApiError::validation("Passwords don't match"));
    }

    Ok(())
}

pub fn validate_search_term(term: Option<&str>) -> Result<&str, ApiError> {
    match term.map(str::trim) {
        Some(term) if !term.is_empty() => Ok(term),
        _ => Err(ApiError::validation("Missing search term")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration<'a>(username: &'a str, password: &'a str, confirm: &'a str) -> Registration<'a> {
        Registration {
            name: "Alice",
            username,
            password,
            confirm_password: confirm,
            email: "alice@x.com",
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Alice Smith").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("Zoë").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob42").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username("ali ce").is_err());
        assert!(validate_username("alice_1").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@x.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("alice@x").is_err());
        assert!(validate_email("@x.com").is_err());
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration(&registration("alice", "secret1", "secret1")).is_ok());
        assert!(validate_registration(&registration("alice", "secret1", "secret2")).is_err());
        assert!(validate_registration(&registration("a!", "secret1", "secret1")).is_err());
    }

    #[test]
    fn test_validate_search_term() {
        assert_eq!(validate_search_term(Some(" TIL ")).ok(), Some("TIL"));
        assert!(validate_search_term(Some("   ")).is_err());
        assert!(validate_search_term(None).is_err());
    }
}
