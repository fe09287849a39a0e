use dioxus::prelude::*;

use crate::config::ui_config;
use crate::feed::ChatFeed;
use crate::flow::{use_flow_channel, FlowView};
use crate::letter::ApprovalLetterPanel;
use crate::styles::SHELL_STYLES;

/// Top-level layout: chat on the left, agent diagram and letter form on the
/// right. The flow channel is provided here so the feed can publish to it.
#[component]
pub fn LoanAssistant() -> Element {
    let state = use_flow_channel();
    let user_id = ui_config().user_id.clone();

    rsx! {
        style { {SHELL_STYLES} }

        div {
            class: "loan-shell",
            ChatFeed { key: "{user_id}", user_id: user_id.clone() }
            div {
                class: "loan-side",
                FlowView { state }
                ApprovalLetterPanel {}
            }
        }
    }
}
