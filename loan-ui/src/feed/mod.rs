pub mod attachments;
pub mod controller;
pub mod state;
pub mod view;
pub mod ws;

pub use view::ChatFeed;
