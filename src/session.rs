//! The `guest_lang` cookie: the only state kept between requests.

use crate::i18n::LanguageTag;
use axum::http::{header, HeaderMap, HeaderValue};

pub const GUEST_LANG_COOKIE: &str = "guest_lang";

/// Cookie lifetime in seconds (30 minutes)
pub const GUEST_LANG_MAX_AGE: u32 = 1800;

/// Read the guest language from the request cookies.
///
/// Values that are not valid language tags, and `und`, are ignored.
pub fn read_guest_lang(headers: &HeaderMap) -> Option<LanguageTag> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == GUEST_LANG_COOKIE)
        .filter_map(|(_, value)| LanguageTag::parse(value.trim_matches('"')).ok())
        .find(|tag| !tag.is_undetermined())
}

/// Build the `Set-Cookie` header remembering the guest language.
pub fn guest_lang_cookie(tag: &LanguageTag, secure: bool) -> HeaderValue {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        GUEST_LANG_COOKIE, tag, GUEST_LANG_MAX_AGE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    // Tags are ASCII alphanumerics and '-', so this cannot fail
    HeaderValue::from_str(&cookie)
        .unwrap_or_else(|_| HeaderValue::from_static("guest_lang=und; Path=/; Max-Age=0"))
}
