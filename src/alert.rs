//! Success and error messages shown to users.
//!
//! Alerts are rendered inline on full pages (e.g. after logging out) and as
//! fragments that htmx swaps into `#alert-container` when a form submission
//! fails.

use maud::{Markup, html};

/// An alert message with a short headline and optional details.
#[derive(Debug, Clone, Copy)]
pub enum Alert<'a> {
    Success { message: &'a str, details: &'a str },
    Error { message: &'a str, details: &'a str },
}

impl Alert<'_> {
    pub fn into_html(self) -> Markup {
        let (container_style, role, message, details) = match self {
            Alert::Success { message, details } => (
                "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
                dark:bg-gray-800 dark:text-green-400 border border-green-300 \
                dark:border-green-800",
                "status",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 border border-red-300 \
                dark:border-red-800",
                "alert",
                message,
                details,
            ),
        };

        // Template adapted from https://flowbite.com/docs/components/alerts/
        html! {
            div class=(container_style) role=(role)
            {
                span class="font-medium" { (message) }

                @if !details.is_empty()
                {
                    p class="mt-1" { (details) }
                }
            }
        }
    }
}
