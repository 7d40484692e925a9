//! Page rendering
//!
//! Every page is wrapped in the same layout, whose header shows who is
//! signed in. All interpolated text goes through `html_escape`.

use html_escape::{encode_double_quoted_attribute, encode_text};
use hyper::StatusCode;
use tollgate_core::Principal;

/// A page to render, with whatever it needs beyond the principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<'a> {
    Home,
    Login {
        error: Option<&'a str>,
        return_to: Option<&'a str>,
    },
    Signup {
        error: Option<&'a str>,
    },
    MyAccount,
    Error {
        status: StatusCode,
    },
}

/// Turns views into HTML documents
pub trait Renderer: Send + Sync {
    fn render(&self, principal: &Principal, view: &View<'_>) -> anyhow::Result<String>;
}

/// Built-in pages
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        HtmlRenderer
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, principal: &Principal, view: &View<'_>) -> anyhow::Result<String> {
        let (title, content) = match view {
            View::Home => ("Home", home(principal)),
            View::Login { error, return_to } => ("Log in", login_form(*error, *return_to)),
            View::Signup { error } => ("Sign up", signup_form(*error)),
            View::MyAccount => ("My account", my_account(principal)),
            View::Error { status } => ("Error", error_page(*status)),
        };

        Ok(layout(title, principal, &content))
    }
}

fn layout(title: &str, principal: &Principal, content: &str) -> String {
    let nav = match principal.identity() {
        Some(identity) => format!(
            r#"<span>Signed in as {}</span> <a href="/myaccount">My account</a> <a href="/logout">Log out</a>"#,
            encode_text(identity.username())
        ),
        None => r#"<a href="/login">Log in</a> <a href="/signup">Sign up</a>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<header><a href="/">Home</a> {nav}</header>
<main>
{content}
</main>
</body>
</html>
"#,
        title = encode_text(title),
        nav = nav,
        content = content,
    )
}

fn home(principal: &Principal) -> String {
    match principal.identity() {
        Some(identity) => format!("<h1>Welcome back, {}</h1>", encode_text(identity.username())),
        None => "<h1>Welcome</h1>".to_string(),
    }
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|message| format!(r#"<p class="error">{}</p>"#, encode_text(message)))
        .unwrap_or_default()
}

fn login_form(error: Option<&str>, return_to: Option<&str>) -> String {
    let return_field = return_to
        .map(|target| {
            format!(
                r#"<input type="hidden" name="return" value="{}">"#,
                encode_double_quoted_attribute(target)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<h1>Log in</h1>
{banner}<form method="post" action="/login">
{return_field}
<label>Username <input name="username" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        banner = error_banner(error),
        return_field = return_field,
    )
}

fn signup_form(error: Option<&str>) -> String {
    format!(
        r#"<h1>Sign up</h1>
{banner}<form method="post" action="/signup">
<label>Username <input name="username" required></label>
<label>Password <input name="password" type="password" required></label>
<label>Email <input name="email" type="email" required></label>
<label>First name <input name="firstname" required></label>
<label>Last name <input name="lastname" required></label>
<fieldset><legend>Date of birth</legend>
<input name="dob-year" placeholder="YYYY" required>
<input name="dob-month" placeholder="MM" required>
<input name="dob-day" placeholder="DD" required>
</fieldset>
<button type="submit">Sign up</button>
</form>"#,
        banner = error_banner(error),
    )
}

fn my_account(principal: &Principal) -> String {
    let username = principal
        .identity()
        .map(|identity| identity.username())
        .unwrap_or_default();
    format!("<h1>My account</h1>\n<p>Username: {}</p>", encode_text(username))
}

fn error_page(status: StatusCode) -> String {
    format!(
        "<h1>{}</h1>\n<p>{}</p>",
        status.as_u16(),
        encode_text(status.canonical_reason().unwrap_or("Error"))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_core::Identity;

    #[test]
    fn test_header_reflects_principal() {
        let renderer = HtmlRenderer::new();

        let anonymous = renderer.render(&Principal::Anonymous, &View::Home).unwrap();
        assert!(anonymous.contains(r#"href="/login""#));
        assert!(!anonymous.contains("Signed in as"));

        let alice = Principal::User(Identity::new("alice"));
        let signed_in = renderer.render(&alice, &View::Home).unwrap();
        assert!(signed_in.contains("Signed in as alice"));
        assert!(signed_in.contains(r#"href="/logout""#));
    }

    #[test]
    fn test_interpolated_text_is_escaped() {
        let renderer = HtmlRenderer::new();
        let mallory = Principal::User(Identity::new("<script>x</script>"));

        let page = renderer.render(&mallory, &View::MyAccount).unwrap();
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));

        let login = renderer
            .render(
                &Principal::Anonymous,
                &View::Login {
                    error: Some("<b>bad</b>"),
                    return_to: Some(r#"/x"><script>"#),
                },
            )
            .unwrap();
        assert!(!login.contains("<b>bad</b>"));
        assert!(!login.contains(r#""><script>"#));
    }

    #[test]
    fn test_login_form_carries_return_target() {
        let page = HtmlRenderer::new()
            .render(
                &Principal::Anonymous,
                &View::Login {
                    error: None,
                    return_to: Some("/myaccount"),
                },
            )
            .unwrap();
        assert!(page.contains(r#"name="return" value="/myaccount""#));
    }

    #[test]
    fn test_error_page_shows_status() {
        let page = HtmlRenderer::new()
            .render(
                &Principal::Anonymous,
                &View::Error {
                    status: StatusCode::NOT_FOUND,
                },
            )
            .unwrap();
        assert!(page.contains("404"));
        assert!(page.contains("Not Found"));
    }
}
