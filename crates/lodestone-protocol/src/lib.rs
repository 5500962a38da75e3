pub mod codec;
pub mod conn;
pub mod packets;
pub mod registry;
pub mod state;
pub mod version;

mod tables;

pub use codec::*;
pub use conn::{Connection, ProtocolError};
pub use packets::*;
pub use registry::{
    clientbound_id, clientbound_kind, definition, serverbound_id, serverbound_kind, Definition,
};
pub use state::*;
pub use version::Version;
