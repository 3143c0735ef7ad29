//! One-shot messages carried to the next rendered page in a cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar};

const FLASH_COOKIE: &str = "flash";

/// Queue `message` for the next page
pub fn push(jar: CookieJar, message: impl AsRef<str>) -> CookieJar {
    let value = urlencoding::encode(message.as_ref()).into_owned();
    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true),
    )
}

/// Take the pending message, clearing the cookie
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let message = urlencoding::decode(cookie.value())
        .ok()
        .map(|message| message.into_owned())
        .filter(|message| !message.is_empty());

    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_take() {
        let jar = push(CookieJar::new(), "Venue Hall A; was listed!");
        let cookie = jar.get(FLASH_COOKIE).unwrap();
        assert!(!cookie.value().contains(' '));
        assert!(!cookie.value().contains(';'));

        let (jar, message) = take(jar);
        assert_eq!(message.as_deref(), Some("Venue Hall A; was listed!"));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn test_take_without_message() {
        let (_, message) = take(CookieJar::new());
        assert_eq!(message, None);
    }
}
