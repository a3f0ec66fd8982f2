//! HTML pages.
//!
//! All dynamic content goes through maud, which escapes it.

use maud::{DOCTYPE, Markup, html};

/// A stored paste, shown verbatim inside `<pre>`.
pub fn paste_page(payload: &[u8]) -> Markup {
    html! {
        (DOCTYPE)
        pre { (String::from_utf8_lossy(payload)) }
    }
}

/// Shown at the root path while the store is empty, with a form that posts
/// a `text` field to `endpoint`.
pub fn welcome_page(endpoint: &str) -> Markup {
    html! {
        (DOCTYPE)
        h1 { "Welcome!" }
        form method="post" action=(endpoint) {
            textarea name="text" rows="20" cols="80" {}
            br;
            button type="submit" { "Paste" }
        }
    }
}
