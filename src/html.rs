//! Shared markup: the base document shell, form field helpers and the
//! Tailwind class strings reused across pages.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};

pub const LINK_STYLE: &str = "text-indigo-600 hover:text-indigo-500 \
    dark:text-indigo-400 dark:hover:text-indigo-300 underline";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 rounded text-white \
    bg-indigo-600 hover:enabled:bg-indigo-500 disabled:bg-indigo-800 \
    dark:bg-indigo-500 hover:enabled:dark:bg-indigo-400";

pub const BUTTON_DELETE_STYLE: &str = "underline text-rose-600 \
    hover:text-rose-500 dark:text-rose-400 dark:hover:text-rose-300 \
    bg-transparent border-none cursor-pointer";

pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-slate-900 dark:text-white";

pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-slate-900 dark:text-white bg-slate-50 dark:bg-slate-700 \
    border border-slate-300 dark:border-slate-600 dark:placeholder-slate-400 \
    focus:ring-indigo-500 focus:border-indigo-500";

pub const FORM_RADIO_GROUP_STYLE: &str = "flex gap-4";

pub const FORM_RADIO_INPUT_STYLE: &str = "h-4 w-4 shrink-0 cursor-pointer \
    text-indigo-600 border-slate-300 dark:border-slate-600 \
    focus-visible:ring-2 focus-visible:ring-indigo-500";

pub const FORM_RADIO_LABEL_STYLE: &str = "text-sm font-medium cursor-pointer \
    text-slate-900 dark:text-white";

pub const TABLE_HEADER_STYLE: &str = "text-xs uppercase text-slate-700 \
    bg-slate-50 dark:bg-slate-700 dark:text-slate-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-slate-800 dark:border-slate-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

pub const CARD_STYLE: &str = "rounded-lg p-6 shadow-md bg-white dark:bg-slate-800 \
    border border-slate-200 dark:border-slate-700";

pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-slate-900 dark:text-white";

/// Extra content to inject into the document head of [base].
pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// Inline JavaScript source code.
    #[allow(dead_code)]
    ScriptSource(PreEscaped<String>),
    /// Inline CSS.
    Style(PreEscaped<String>),
}

/// The document shell every page renders into.
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Fintrack" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptLink(path) => script src=(path) {}
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::Style(text) => style { (text) }
                    }
                }

                script src="/static/app.js" defer {}
            }

            body class="container max-w-full min-h-screen bg-slate-50 dark:bg-slate-900"
            {
                (content)
            }
        }
    }
}

/// A full-page error screen with a short code, a headline and a hint for
/// getting back on track.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        main class="flex min-h-screen items-center justify-center px-6"
        {
            div class="text-center max-w-lg"
            {
                p class="text-6xl lg:text-8xl font-extrabold tracking-tight text-indigo-600 dark:text-indigo-400 mb-4"
                {
                    (header)
                }

                h1 class="text-2xl lg:text-3xl font-bold text-slate-900 dark:text-white mb-2"
                {
                    (description)
                }

                p class="text-slate-600 dark:text-slate-300 mb-6" { (fix) }

                a
                    href="/"
                    class="inline-flex px-5 py-2.5 rounded text-sm font-medium text-white
                        bg-indigo-600 hover:bg-indigo-500 focus:ring-4 focus:ring-indigo-300
                        dark:focus:ring-indigo-800"
                {
                    "Back to the dashboard"
                }
            }
        }
    );

    base(title, &[], &content)
}

/// The centered single-card layout shared by the log-in and registration
/// screens.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            p class="flex items-center mb-6 text-2xl font-semibold text-slate-900 dark:text-white"
            {
                "Fintrack"
            }

            div class="w-full sm:max-w-md rounded-lg shadow bg-white dark:bg-slate-800 dark:border dark:border-slate-700"
            {
                div class="p-6 sm:p-8 space-y-4 md:space-y-6"
                {
                    h1 class="text-xl md:text-2xl font-bold leading-tight tracking-tight text-slate-900 dark:text-white"
                    {
                        (form_title)
                    }

                    (form)
                }
            }
        }
    }
}

/// An email field with an optional inline error line underneath.
pub fn email_input(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="email" class=(FORM_LABEL_STYLE) { "Email" }

            input
                type="email"
                name="email"
                id="email"
                placeholder="you@example.com"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus
                value=(email);

            @if let Some(error_message) = error_message
            {
                p class="text-rose-500 text-base" { (error_message) }
            }
        }
    }
}

/// A password field with an optional inline error line underneath.
pub fn password_input(password: &str, min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="password" class=(FORM_LABEL_STYLE) { "Password" }

            input
                type="password"
                name="password"
                id="password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                value=(password)
                minlength=(min_length);

            @if let Some(error_message) = error_message
            {
                p class="text-rose-500 text-base" { (error_message) }
            }
        }
    }
}

/// A small inline spinner shown while htmx swaps are in flight.
pub fn loading_spinner() -> Markup {
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline w-4 h-4 me-2 mb-1 animate-spin text-white"
            viewBox="0 0 24 24"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            circle cx="12" cy="12" r="10" stroke="currentColor" stroke-opacity="0.25" stroke-width="4" {}
            path
                d="M22 12a10 10 0 0 0-10-10"
                stroke="currentColor"
                stroke-width="4"
                stroke-linecap="round" {}
        }
    }
}

/// CSS that draws a dollar-sign prefix inside number inputs wrapped in
/// `.input-wrapper`.
pub fn dollar_input_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        r#"
        .input-wrapper {
            position: relative;
            display: inline-block;
        }
        .input-wrapper input[type="number"] {
            padding-left: 1.4rem;
        }
        .input-wrapper::before {
            content: '$';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }
        "#
        .to_owned(),
    ))
}

/// Formats an amount as dollars and cents, e.g. `-1234.5` -> `"-$1,234.50"`.
pub fn format_currency(number: f64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();

    if number == 0.0 {
        // numfmt renders zero as a bare "0".
        return "$0.00".to_owned();
    }

    let fmt = FMT.get_or_init(|| {
        Formatter::currency("$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let sign = if number < 0.0 { "-" } else { "" };
    let mut formatted = fmt.fmt_string(number.abs());

    // numfmt drops a trailing zero in the cents ("12.3" for 12.30).
    if formatted.as_bytes()[formatted.len() - 3] != b'.' {
        formatted.push('0');
    }

    format!("{sign}{formatted}")
}

/// An inline text link.
pub fn link(url: &str, text: &str) -> Markup {
    html!(
        a href=(url) class=(LINK_STYLE) { (text) }
    )
}
