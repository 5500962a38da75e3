pub mod client;
pub mod component;
pub mod events;

pub use client::{Client, ClientBuilder, ClientError, PlayerPosition};
pub use component::{ChatComponent, ChatPart};
pub use events::Event;
