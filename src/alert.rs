//! Alert system for displaying error messages to users.
//!
//! Alerts replace the `#alert-container` element of the base page, so they
//! are returned from htmx endpoints with `hx-target-error="#alert-container"`
//! and `hx-swap="outerHTML"`.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A message to show in the alert container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// An error message with extra details.
    Error {
        /// The headline.
        message: String,
        /// The body text.
        details: String,
    },
    /// An error message on its own.
    ErrorSimple {
        /// The headline.
        message: String,
    },
}

impl Alert {
    /// Render the alert, including the container it replaces.
    pub fn into_html(self) -> Markup {
        let (message, details) = match self {
            Alert::Error { message, details } => (message, Some(details)),
            Alert::ErrorSimple { message } => (message, None),
        };

        html! {
            div
                id="alert-container"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class="flex items-start gap-3 p-4 border rounded-lg shadow text-red-800 \
                        bg-red-50 border-red-300 dark:bg-gray-800 dark:text-red-400 \
                        dark:border-red-800"
                {
                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty())
                        {
                            p class="text-sm mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Fechar"
                        class="text-lg leading-none"
                        onclick="document.getElementById('alert-container').classList.add('hidden')"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

#[cfg(test)]
mod tests {
    use scraper::Selector;

    use crate::test_utils::parse_markup;

    use super::Alert;

    #[test]
    fn error_alert_shows_message_and_details() {
        let html = Alert::Error {
            message: "Data inválida".to_owned(),
            details: "Linha 2".to_owned(),
        }
        .into_html();

        let fragment = parse_markup(&html);
        let alert = fragment
            .select(&Selector::parse("[role=alert]").unwrap())
            .next()
            .expect("could not find alert");

        let text: String = alert.text().collect();
        assert!(text.contains("Data inválida"));
        assert!(text.contains("Linha 2"));
    }

    #[test]
    fn simple_alert_has_single_paragraph() {
        let html = Alert::ErrorSimple {
            message: "Selecione um arquivo para enviar.".to_owned(),
        }
        .into_html();

        let fragment = parse_markup(&html);
        let paragraphs = fragment.select(&Selector::parse("p").unwrap()).count();

        assert_eq!(paragraphs, 1);
        assert!(
            fragment
                .select(&Selector::parse("#alert-container").unwrap())
                .next()
                .is_some()
        );
    }
}
