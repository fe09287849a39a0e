pub mod api;
pub mod bridge;
pub mod components;
pub mod config;
pub mod feed;
pub mod flow;
pub mod letter;
pub mod styles;

pub use api::*;
pub use components::*;
pub use feed::ChatFeed;
pub use flow::{use_flow_channel, FlowView};
pub use letter::ApprovalLetterPanel;
