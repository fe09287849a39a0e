use dioxus::prelude::*;
use dioxus_logger::tracing::{error, info};
use shared_types::ApprovalLetterRequest;

use crate::api::generate_approval_letter;
use crate::styles::LETTER_STYLES;

#[derive(Clone, Debug, PartialEq)]
enum LetterStatus {
    Editing,
    Generating,
    Ready(String),
    Failed(String),
}

/// Form for requesting a pre-approval letter; the generated HTML is shown
/// in a sandboxed frame.
#[component]
pub fn ApprovalLetterPanel() -> Element {
    let mut form = use_signal(ApprovalLetterRequest::default);
    let mut status = use_signal(|| LetterStatus::Editing);

    let submit = use_callback(move |_| {
        let request = form.read().clone();
        let missing = request.missing_fields();
        if !missing.is_empty() {
            status.set(LetterStatus::Failed(format!(
                "Missing: {}",
                missing.join(", ")
            )));
            return;
        }
        status.set(LetterStatus::Generating);
        spawn(async move {
            match generate_approval_letter(&request).await {
                Ok(html) => {
                    info!("Approval letter generated for {}", request.application_name);
                    status.set(LetterStatus::Ready(html));
                }
                Err(e) => {
                    error!("Approval letter failed: {}", e);
                    status.set(LetterStatus::Failed(e.to_string()));
                }
            }
        });
    });

    let generating = status() == LetterStatus::Generating;
    let same_as_mail = form.read().property_address_same_as_mail;

    rsx! {
        style { {LETTER_STYLES} }

        div {
            class: "letter-card",
            h3 { class: "letter-title", "Pre-approval letter" }
            div {
                class: "letter-grid",
                TextField {
                    label: "Applicant name",
                    value: form.read().application_name.clone(),
                    on_change: move |v| form.write().application_name = v,
                }
                TextField {
                    label: "Date",
                    value: form.read().date.clone(),
                    on_change: move |v| form.write().date = v,
                }
                TextField {
                    label: "Loan amount",
                    value: form.read().loan_amount.clone(),
                    on_change: move |v| form.write().loan_amount = v,
                }
                TextField {
                    label: "Loan terms",
                    value: form.read().loan_terms.clone(),
                    on_change: move |v| form.write().loan_terms = v,
                }
                TextField {
                    label: "Purchase price",
                    value: form.read().purchase_price.clone(),
                    on_change: move |v| form.write().purchase_price = v,
                }
                TextField {
                    label: "Mailing address",
                    value: form.read().mail_address.clone(),
                    on_change: move |v| form.write().mail_address = v,
                }
                if !same_as_mail {
                    TextField {
                        label: "Property address",
                        value: form.read().property_address.clone(),
                        on_change: move |v| form.write().property_address = v,
                    }
                }
            }
            div {
                class: "letter-checks",
                CheckField {
                    label: "Property address same as mailing",
                    checked: same_as_mail,
                    on_change: move |v| form.write().property_address_same_as_mail = v,
                }
                CheckField {
                    label: "Satisfactory purchase agreement",
                    checked: form.read().satisfactory_purchase_agreement,
                    on_change: move |v| form.write().satisfactory_purchase_agreement = v,
                }
                CheckField {
                    label: "Sufficient appraisal",
                    checked: form.read().sufficient_appraisal,
                    on_change: move |v| form.write().sufficient_appraisal = v,
                }
                CheckField {
                    label: "Marketable title",
                    checked: form.read().marketable_title,
                    on_change: move |v| form.write().marketable_title = v,
                }
            }
            button {
                class: "letter-submit",
                disabled: generating,
                onclick: move |_| submit.call(()),
                if generating { "Generating..." } else { "Generate letter" }
            }
            {status_view(status())}
        }
    }
}

fn status_view(status: LetterStatus) -> Element {
    match status {
        LetterStatus::Failed(message) => rsx! {
            p { class: "letter-error", "{message}" }
        },
        LetterStatus::Ready(html) => rsx! {
            iframe {
                class: "letter-preview",
                "sandbox": "",
                srcdoc: "{html}",
            }
        },
        LetterStatus::Editing | LetterStatus::Generating => rsx! {},
    }
}

#[component]
fn TextField(label: &'static str, value: String, on_change: EventHandler<String>) -> Element {
    rsx! {
        label {
            class: "letter-field",
            span { "{label}" }
            input {
                r#type: "text",
                value: "{value}",
                oninput: move |e: FormEvent| on_change.call(e.value()),
            }
        }
    }
}

#[component]
fn CheckField(label: &'static str, checked: bool, on_change: EventHandler<bool>) -> Element {
    rsx! {
        label {
            class: "letter-check",
            input {
                r#type: "checkbox",
                checked,
                onchange: move |e: FormEvent| on_change.call(e.checked()),
            }
            span { "{label}" }
        }
    }
}
