use dioxus::prelude::*;

use crate::progress::ProgressPanel;
use crate::t;

#[component]
pub fn Progress() -> Element {
    rsx! {
        section { class: "page page-progress",
            h1 { {t!("progress-title")} }
            p { {t!("progress-intro")} }

            ProgressPanel {}
        }
    }
}
