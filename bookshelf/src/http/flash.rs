//! One-shot notices carried across a redirect.
//!
//! The cookie holds a short code rather than the message text; it is signed with the
//! session key and cleared by the page that displays it.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;

pub const FLASH_COOKIE: &str = "bookshelf.flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    UsernameTaken,
    RegistrationIncomplete,
    MissingCredentials,
    IncorrectUsername,
    IncorrectPassword,
}

impl Flash {
    const ALL: [Flash; 5] = [
        Flash::UsernameTaken,
        Flash::RegistrationIncomplete,
        Flash::MissingCredentials,
        Flash::IncorrectUsername,
        Flash::IncorrectPassword,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Flash::UsernameTaken => "username-taken",
            Flash::RegistrationIncomplete => "registration-incomplete",
            Flash::MissingCredentials => "missing-credentials",
            Flash::IncorrectUsername => "incorrect-username",
            Flash::IncorrectPassword => "incorrect-password",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::UsernameTaken => "Username already taken",
            Flash::RegistrationIncomplete => "Username and password are required",
            Flash::MissingCredentials => "Missing credentials",
            Flash::IncorrectUsername => "Incorrect username.",
            Flash::IncorrectPassword => "Incorrect password.",
        }
    }
}

pub fn set(jar: SignedCookieJar, flash: Flash) -> SignedCookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.code()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Read and clear the pending notice, if any.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = Flash::from_code(cookie.value());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}
