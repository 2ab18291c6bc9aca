//! The navigation bar rendered on every signed-in page.

use maud::{Markup, html};

use crate::endpoints;

/// One entry in the navigation bar. At most one entry is current at a time,
/// and it renders highlighted.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 rounded-sm text-white bg-indigo-600 \
            lg:bg-transparent lg:p-0 lg:text-indigo-600 lg:dark:text-indigo-400"
        } else {
            "block py-2 px-3 rounded-sm text-slate-900 dark:text-white \
            hover:bg-slate-100 dark:hover:bg-slate-700 lg:p-0 lg:border-0 \
            lg:hover:bg-transparent lg:hover:text-indigo-600 \
            lg:dark:hover:bg-transparent lg:dark:hover:text-indigo-400"
        };

        html!( a href=(self.url) class=(style) { (self.title) } )
    }
}

/// The navigation bar shown at the top of every signed-in page.
pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
    user_email: Option<&'a str>,
}

impl<'a> NavBar<'a> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let links = vec![
            Link {
                url: endpoints::DASHBOARD_VIEW,
                title: "Dashboard",
                is_current: active_endpoint == endpoints::DASHBOARD_VIEW,
            },
            Link {
                url: endpoints::TRANSACTIONS_VIEW,
                title: "Transactions",
                is_current: active_endpoint == endpoints::TRANSACTIONS_VIEW,
            },
            Link {
                url: endpoints::BUDGET_VIEW,
                title: "Budget",
                is_current: active_endpoint == endpoints::BUDGET_VIEW,
            },
            Link {
                url: endpoints::REPORTS_VIEW,
                title: "Reports",
                is_current: active_endpoint == endpoints::REPORTS_VIEW,
            },
        ];

        NavBar {
            links,
            user_email: None,
        }
    }

    /// Show "Signed in as `email`" next to the log out link.
    pub fn with_user_email(mut self, email: &'a str) -> Self {
        self.user_email = Some(email);
        self
    }

    pub fn into_html(self) -> Markup {
        html!(
            nav class="bg-white dark:bg-slate-900 border-b border-slate-200 dark:border-slate-700"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href="/" class="text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Fintrack"
                    }

                    ul
                        class="font-medium flex flex-col mt-4 p-4 rounded border \
                        border-slate-100 dark:border-slate-700 bg-slate-50 dark:bg-slate-800 \
                        lg:flex-row lg:gap-x-8 lg:mt-0 lg:p-0 lg:border-0 \
                        lg:bg-white lg:dark:bg-slate-900"
                    {
                        @for link in self.links.into_iter() {
                            li { (link.into_html()) }
                        }
                    }

                    div class="flex items-center gap-x-4 text-slate-900 dark:text-white"
                    {
                        @if let Some(email) = self.user_email {
                            span class="text-sm" { "Signed in as " (email) }
                        }

                        a
                            href=(endpoints::LOG_OUT)
                            class="text-sm font-medium text-rose-600 hover:text-rose-500 \
                            dark:text-rose-400 dark:hover:text-rose-300"
                        {
                            "Sign Out"
                        }
                    }
                }
            }
        )
    }
}
