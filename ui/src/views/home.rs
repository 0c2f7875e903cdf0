use dioxus::prelude::*;

use crate::t;

#[component]
pub fn Home() -> Element {
    // Subscribe to the global language code (if provided) so we re-render on change.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang = lang_code.map(|s| s()).unwrap_or_else(|| "en-US".to_string());
    tracing::trace!(%lang, "home render");

    rsx! {
        section { class: "page page-home",
            h1 { {t!("home-title")} }
            p { {t!("home-tagline-short")} }
            p { {t!("home-intro")} }

            ul { class: "page-home__features",
                li { {t!("home-feature-chart")} }
                li { {t!("home-feature-filters")} }
                li { {t!("home-feature-local")} }
            }
            p { class: "page-home__cta",
                {t!("home-cta")}
            }
        }
    }
}
