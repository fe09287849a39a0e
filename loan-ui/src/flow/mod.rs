pub mod graph;
pub mod state;
pub mod view;

use dioxus::prelude::*;
use dioxus_logger::tracing::debug;
use futures_util::StreamExt;
use gloo_timers::future::TimeoutFuture;

use state::{reduce, Deferred, FlowCommand, FlowState};

pub use view::FlowView;

/// Owns the diagram state and the command channel that feeds it.
///
/// Descendants reach the channel with `use_coroutine_handle::<FlowCommand>()`
/// and never touch the state directly.
pub fn use_flow_channel() -> Signal<FlowState> {
    let state = use_signal(FlowState::default);
    use_coroutine(move |mut rx: UnboundedReceiver<FlowCommand>| async move {
        while let Some(command) = rx.next().await {
            apply(state, command);
        }
    });
    state
}

fn apply(mut state: Signal<FlowState>, command: FlowCommand) {
    debug!("Flow command: {}", command.kind());
    let transition = reduce(&state.read(), command);
    state.set(transition.state);

    // Timers are tasks of the owning scope and die with it.
    if let Some(Deferred { delay_ms, command }) = transition.deferred {
        spawn(async move {
            TimeoutFuture::new(delay_ms).await;
            apply(state, command);
        });
    }
}
