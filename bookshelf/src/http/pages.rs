use axum::http::StatusCode;

use crate::books::Book;

use super::flash::Flash;

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = html_escape(title),
    )
}

fn flash_block(flash: Option<Flash>) -> String {
    match flash {
        Some(flash) => format!(
            "<ul class=\"messages\"><li>{}</li></ul>\n",
            html_escape(flash.message())
        ),
        None => String::new(),
    }
}

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\">\n\
         <label>Username <input type=\"text\" name=\"username\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">{submit}</button>\n\
         </form>\n"
    )
}

pub fn register_page(flash: Option<Flash>) -> String {
    let body = format!(
        "<h1>Register</h1>\n{}{}<p>Already registered? <a href=\"/auth/login\">Log in</a></p>\n",
        flash_block(flash),
        credentials_form("/auth/register", "Register"),
    );
    layout("Register", &body)
}

pub fn login_page(flash: Option<Flash>) -> String {
    let body = format!(
        "<h1>Log in</h1>\n{}{}<p>No account? <a href=\"/auth/register\">Register</a></p>\n",
        flash_block(flash),
        credentials_form("/auth/login", "Log in"),
    );
    layout("Log in", &body)
}

pub fn books_page(username: &str, books: &[Book]) -> String {
    let mut body = format!(
        "<h1>Books</h1>\n<p>Signed in as {} (<a href=\"/auth/logout\">log out</a>)</p>\n<ul class=\"books\">\n",
        html_escape(username)
    );
    for book in books {
        body.push_str(&format!(
            "<li><strong>{}</strong> by {}</li>\n",
            html_escape(book.title),
            html_escape(book.author)
        ));
    }
    body.push_str("</ul>\n");
    layout("Books", &body)
}

pub fn error_page(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    let body = format!("<h1>{} {}</h1>\n", status.as_u16(), html_escape(reason));
    layout(reason, &body)
}
