//! Server-rendered HTML pages.
//!
//! Every value coming from storage or the request is escaped with
//! `html-escape` before it is written into markup.

use axum::response::Html;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

use crate::models::acronym::{Acronym, Category};
use crate::models::user::{Actor, PublicUser, User};

/// Per-page chrome: navigation state and the cookie banner.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageContext<'a> {
    pub actor: Option<&'a Actor>,
    pub show_cookie_message: bool,
}

fn layout(title: &str, ctx: PageContext<'_>, body: &str) -> Html<String> {
    let mut nav = String::from(
        "<a href=\"/\">TIL</a> <a href=\"/users\">All Users</a> <a href=\"/categories\">All Categories</a> <a href=\"/acronyms/create\">Create An Acronym</a>",
    );
    match ctx.actor {
        Some(actor) => {
            let _ = write!(
                nav,
                " <a href=\"/users/{}\">{}</a> <form class=\"logout\" action=\"/logout\" method=\"post\"><input type=\"submit\" value=\"Log out\"></form>",
                actor.id,
                text(&actor.username)
            );
        }
        None => nav.push_str(" <a href=\"/register\">Register</a> <a href=\"/login\">Log In</a>"),
    }

    let cookie_banner = if ctx.show_cookie_message {
        "<div id=\"cookie-footer\">This site uses cookies! To accept this, click <a href=\"/?cookies-accepted=true\">OK</a></div>"
    } else {
        ""
    };

    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} | Acronyms</title></head>\n<body>\n<nav>{nav}</nav>\n<main>\n{body}\n</main>\n{cookie_banner}\n</body>\n</html>\n",
        text(title)
    ))
}

fn acronym_table(acronyms: &[Acronym]) -> String {
    if acronyms.is_empty() {
        return "<h2>There aren't any acronyms yet!</h2>".to_string();
    }

    let mut html = String::from("<table><thead><tr><th>Short</th><th>Long</th></tr></thead><tbody>");
    for acronym in acronyms {
        let _ = write!(
            html,
            "<tr><td><a href=\"/acronyms/{}\">{}</a></td><td>{}</td></tr>",
            acronym.id,
            text(&acronym.short),
            text(&acronym.long)
        );
    }
    html.push_str("</tbody></table>");
    html
}

fn category_links(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| format!("<li><a href=\"/categories/{}\">{}</a></li>", c.id, text(&c.name)))
        .collect()
}

pub fn index(ctx: PageContext<'_>, acronyms: &[Acronym]) -> Html<String> {
    let body = format!("<h1>Acronyms</h1>\n{}", acronym_table(acronyms));
    layout("Home Page", ctx, &body)
}

pub fn acronym(
    ctx: PageContext<'_>,
    acronym: &Acronym,
    owner: &PublicUser,
    categories: &[Category],
) -> Html<String> {
    let mut body = format!(
        "<h1>{}</h1>\n<h2>{}</h2>\n<p>Created by <a href=\"/users/{}\">{}</a></p>",
        text(&acronym.short),
        text(&acronym.long),
        owner.id,
        text(&owner.name)
    );

    if !categories.is_empty() {
        let _ = write!(body, "\n<h3>Categories</h3>\n<ul>{}</ul>", category_links(categories));
    }

    let _ = write!(
        body,
        "\n<form method=\"post\" action=\"/acronyms/{id}/delete\"><a href=\"/acronyms/{id}/edit\">Edit</a> <input type=\"submit\" value=\"Delete\"></form>",
        id = acronym.id
    );

    layout(&acronym.short, ctx, &body)
}

pub fn user(ctx: PageContext<'_>, user: &User, acronyms: &[Acronym]) -> Html<String> {
    let mut body = String::new();

    if user.profile_picture.is_some() {
        let _ = write!(
            body,
            "<img src=\"/users/{}/profilePicture\" alt=\"{}\">\n",
            user.id,
            attr(&user.name)
        );
    }

    let _ = write!(
        body,
        "<h1>{}</h1>\n<h2>{}</h2>",
        text(&user.name),
        text(&user.username)
    );

    if let Some(twitter) = &user.twitter_url {
        let _ = write!(body, "\n<h3>{}</h3>", text(twitter));
    }

    if ctx.actor.is_some_and(|a| a.id == user.id) {
        let _ = write!(
            body,
            "\n<a href=\"/users/{}/addProfilePicture\">{}</a>",
            user.id,
            if user.profile_picture.is_some() {
                "Update Profile Picture"
            } else {
                "Add Profile Picture"
            }
        );
    }

    let _ = write!(body, "\n{}", acronym_table(acronyms));
    layout(&user.name, ctx, &body)
}

pub fn all_users(ctx: PageContext<'_>, users: &[PublicUser]) -> Html<String> {
    let body = if users.is_empty() {
        "<h1>All Users</h1>\n<h2>There aren't any users yet!</h2>".to_string()
    } else {
        let mut html =
            String::from("<h1>All Users</h1>\n<table><thead><tr><th>Username</th><th>Name</th></tr></thead><tbody>");
        for user in users {
            let _ = write!(
                html,
                "<tr><td><a href=\"/users/{}\">{}</a></td><td>{}</td></tr>",
                user.id,
                text(&user.username),
                text(&user.name)
            );
        }
        html.push_str("</tbody></table>");
        html
    };
    layout("All Users", ctx, &body)
}

pub fn all_categories(ctx: PageContext<'_>, categories: &[Category]) -> Html<String> {
    let body = if categories.is_empty() {
        "<h1>All Categories</h1>\n<h2>There aren't any categories yet!</h2>".to_string()
    } else {
        format!("<h1>All Categories</h1>\n<ul>{}</ul>", category_links(categories))
    };
    layout("All Categories", ctx, &body)
}

pub fn category(ctx: PageContext<'_>, category: &Category, acronyms: &[Acronym]) -> Html<String> {
    let body = format!("<h1>{}</h1>\n{}", text(&category.name), acronym_table(acronyms));
    layout(&category.name, ctx, &body)
}

/// Existing values shown when the acronym form is used for editing.
/// Values shown in the acronym form, either stored or as last submitted.
#[derive(Debug, Default)]
pub struct AcronymFields<'a> {
    pub short: &'a str,
    pub long: &'a str,
    pub categories: String,
}

impl<'a> AcronymFields<'a> {
    #[must_use]
    pub fn from_acronym(acronym: &'a Acronym, categories: &[Category]) -> Self {
        Self {
            short: &acronym.short,
            long: &acronym.long,
            categories: categories
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Create form when `editing` is `None`, otherwise the edit form for that acronym.
pub fn acronym_form(
    ctx: PageContext<'_>,
    editing: Option<i32>,
    fields: &AcronymFields<'_>,
    error: Option<&str>,
    csrf_token: &str,
) -> Html<String> {
    let (title, action, submit) = match editing {
        Some(id) => ("Edit Acronym", format!("/acronyms/{id}/edit"), "Update"),
        None => ("Create an Acronym", "/acronyms/create".to_string(), "Submit"),
    };

    let mut body = format!("<h1>{title}</h1>");
    if let Some(error) = error {
        let _ = write!(body, "\n<div class=\"alert\">{}</div>", text(error));
    }
    let _ = write!(
        body,
        "\n<form method=\"post\" action=\"{action}\">\n<input type=\"hidden\" name=\"csrf_token\" value=\"{csrf}\">\n<label for=\"short\">Acronym</label> <input type=\"text\" name=\"short\" id=\"short\" value=\"{short}\">\n<label for=\"long\">Meaning</label> <input type=\"text\" name=\"long\" id=\"long\" value=\"{long}\">\n<label for=\"categories\">Categories (comma separated)</label> <input type=\"text\" name=\"categories\" id=\"categories\" value=\"{categories}\">\n<button type=\"submit\">{submit}</button>\n</form>",
        csrf = attr(csrf_token),
        short = attr(fields.short),
        long = attr(fields.long),
        categories = attr(&fields.categories),
    );
    layout(title, ctx, &body)
}

pub fn login(ctx: PageContext<'_>, login_error: bool, oauth: &[(&str, &str)]) -> Html<String> {
    let mut body = String::from("<h1>Log In</h1>");
    if login_error {
        body.push_str("\n<div class=\"alert\">User authentication error. Either your username or password was invalid.</div>");
    }
    body.push_str(
        "\n<form method=\"post\" action=\"/login\">\n<label for=\"username\">Username</label> <input type=\"text\" name=\"username\" id=\"username\">\n<label for=\"password\">Password</label> <input type=\"password\" name=\"password\" id=\"password\">\n<button type=\"submit\">Log In</button>\n</form>",
    );
    for (path, label) in oauth {
        let _ = write!(body, "\n<a href=\"{}\">{}</a>", attr(path), text(label));
    }
    body.push_str("\n<a href=\"/forgottenPassword\">Forgotten your password?</a>");
    layout("Log In", ctx, &body)
}

pub fn register(ctx: PageContext<'_>, message: Option<&str>) -> Html<String> {
    let mut body = String::from("<h1>Register</h1>");
    if let Some(message) = message {
        let _ = write!(
            body,
            "\n<div class=\"alert\">Please fix the following errors:<br>{}</div>",
            text(message)
        );
    }
    body.push_str(
        "\n<form method=\"post\" action=\"/register\">\n<label for=\"name\">Name</label> <input type=\"text\" name=\"name\" id=\"name\">\n<label for=\"username\">Username</label> <input type=\"text\" name=\"username\" id=\"username\">\n<label for=\"email\">Email</label> <input type=\"email\" name=\"email\" id=\"email\">\n<label for=\"twitter_url\">Twitter handle</label> <input type=\"text\" name=\"twitter_url\" id=\"twitter_url\">\n<label for=\"password\">Password</label> <input type=\"password\" name=\"password\" id=\"password\">\n<label for=\"confirm_password\">Confirm Password</label> <input type=\"password\" name=\"confirm_password\" id=\"confirm_password\">\n<button type=\"submit\">Register</button>\n</form>",
    );
    layout("Register", ctx, &body)
}

pub fn forgotten_password(ctx: PageContext<'_>) -> Html<String> {
    let body = "<h1>Reset Your Password</h1>\n<form method=\"post\" action=\"/forgottenPassword\">\n<label for=\"email\">Email</label> <input type=\"email\" name=\"email\" id=\"email\">\n<button type=\"submit\">Reset Password</button>\n</form>";
    layout("Reset Your Password", ctx, body)
}

/// Shown after a reset request whether or not the email matched a user.
pub fn forgotten_password_confirmed(ctx: PageContext<'_>, title: &str) -> Html<String> {
    let body = format!(
        "<h1>{}</h1>\n<p>If the address belongs to an account, a reset link is on its way.</p>",
        text(title)
    );
    layout(title, ctx, &body)
}

pub fn reset_password(ctx: PageContext<'_>, error: bool) -> Html<String> {
    let mut body = String::from("<h1>Reset Password</h1>");
    if error {
        body.push_str("\n<div class=\"alert\">There was a problem with the form. Ensure you clicked on the full link with the token and your passwords match.</div>");
    }
    body.push_str(
        "\n<form method=\"post\" action=\"/resetPassword\">\n<label for=\"password\">Password</label> <input type=\"password\" name=\"password\" id=\"password\">\n<label for=\"confirm_password\">Confirm Password</label> <input type=\"password\" name=\"confirm_password\" id=\"confirm_password\">\n<button type=\"submit\">Reset</button>\n</form>",
    );
    layout("Reset Password", ctx, &body)
}

pub fn add_profile_picture(ctx: PageContext<'_>, user: &User) -> Html<String> {
    let body = format!(
        "<h1>Add Profile Picture</h1>\n<h2>{}</h2>\n<form method=\"post\" action=\"/users/{}/addProfilePicture\" enctype=\"multipart/form-data\">\n<label for=\"picture\">Select Picture for {}</label> <input type=\"file\" name=\"picture\" id=\"picture\" accept=\"image/*\">\n<button type=\"submit\">Upload</button>\n</form>",
        text(&user.name),
        user.id,
        text(&user.username)
    );
    layout("Add Profile Picture", ctx, &body)
}

pub fn error(status: u16, message: &str) -> Html<String> {
    let body = format!("<h1>Error {status}</h1>\n<p>{}</p>", text(message));
    layout("Error", PageContext::default(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample(short: &str) -> Acronym {
        Acronym {
            id: 1,
            short: short.to_string(),
            long: "Long & <b>bold</b>".to_string(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_index_escapes_values() {
        let page = index(PageContext::default(), &[sample("<script>")]).0;
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("Long &amp; &lt;b&gt;bold&lt;/b&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_edit_form_prefills_categories() {
        let acronym = sample("TIL");
        let categories = vec![
            Category { id: 1, name: "Learning".to_string() },
            Category { id: 2, name: "Fun".to_string() },
        ];
        let page = acronym_form(
            PageContext::default(),
            Some(acronym.id),
            &AcronymFields::from_acronym(&acronym, &categories),
            None,
            "tok\"en",
        )
        .0;

        assert!(page.contains("action=\"/acronyms/1/edit\""));
        assert!(page.contains("value=\"Learning, Fun\""));
        assert!(page.contains("value=\"tok&quot;en\""));
        assert!(!page.contains("class=\"alert\""));
    }

    #[test]
    fn test_create_form_shows_error_and_keeps_input() {
        let fields = AcronymFields {
            short: "",
            long: "Today <I> Learned",
            categories: "Fun".to_string(),
        };
        let page = acronym_form(
            PageContext::default(),
            None,
            &fields,
            Some("short must not be empty"),
            "tok",
        )
        .0;

        assert!(page.contains("action=\"/acronyms/create\""));
        assert!(page.contains("<div class=\"alert\">short must not be empty</div>"));
        assert!(page.contains("value=\"Today &lt;I&gt; Learned\""));
        assert!(page.contains("value=\"Fun\""));
    }

    #[test]
    fn test_cookie_banner_toggle() {
        let with = index(
            PageContext {
                actor: None,
                show_cookie_message: true,
            },
            &[],
        )
        .0;
        let without = index(PageContext::default(), &[]).0;
        assert!(with.contains("cookie-footer"));
        assert!(!without.contains("cookie-footer"));
    }
}
