use dioxus::prelude::*;

use crate::core::session::Session;
use crate::core::settings::Settings;
use crate::t;

/// Access code form shown in place of the progress page while logged out.
#[component]
pub fn LoginPrompt(mut session: Signal<Session>, settings: Settings) -> Element {
    let mut code = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let attempt = code.peek().clone();
        let result = session.write().login(&settings, &attempt);
        match result {
            Ok(()) => {
                code.set(String::new());
                error.set(None);
            }
            Err(_) => error.set(Some(t!("login-rejected"))),
        }
    };

    rsx! {
        section { class: "progress-card login-prompt",
            div { class: "progress-card__header",
                h2 { {t!("login-title")} }
            }
            p { {t!("login-description")} }
            form { class: "login-prompt__form", onsubmit: on_submit,
                label { class: "visually-hidden", r#for: "access-code", {t!("login-code-label")} }
                input {
                    id: "access-code",
                    r#type: "password",
                    class: "login-prompt__input",
                    placeholder: t!("login-code-label"),
                    value: "{code}",
                    oninput: move |evt: FormEvent| code.set(evt.value()),
                }
                button { r#type: "submit", class: "button button--primary", {t!("login-submit")} }
            }
            if let Some(message) = error() {
                p { class: "progress-card__meta progress-card__meta--error", "{message}" }
            }
        }
    }
}
