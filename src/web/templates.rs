//! Fallback document for the single-page client.
//!
//! Served for any non-API GET that has no matching file in the static directory,
//! so client-side routes resolve on reload. The client script and stylesheet
//! themselves come from the static directory.

use maud::{html, Markup, DOCTYPE};

/// Render the application shell.
#[must_use]
pub fn render_app_shell() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "picfeed" }
                link rel="stylesheet" href="/styles.css";
            }
            body {
                header class="topbar" {
                    h1 class="brand" { "picfeed" }
                    select id="current-user" aria-label="Current user" {}
                }
                nav class="tabs" {
                    button data-tab="feed" class="active" { "Feed" }
                    button data-tab="explore" { "Explore" }
                    button data-tab="saved" { "Saved" }
                    button data-tab="notifications" { "Notifications" }
                }
                section id="stories" class="stories" {}
                main id="app" {
                    noscript { "This app requires JavaScript." }
                }
                script src="/app.js" defer {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_loads_client() {
        let page = render_app_shell().into_string();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<script src="/app.js" defer>"#));
        assert!(page.contains(r#"id="app""#));
    }
}
