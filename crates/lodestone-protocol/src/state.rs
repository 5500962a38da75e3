/// The phase of a protocol session. Selects the packet-id table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum State {
    Handshaking = 0,
    Status = 1,
    Login = 2,
    Configuration = 3,
    Play = 4,
}

impl State {
    /// Map the Handshake packet's `next_state` field to a session state.
    pub fn from_handshake_next(next: i32) -> Option<Self> {
        match next {
            1 => Some(State::Status),
            2 => Some(State::Login),
            _ => None,
        }
    }

    /// The `next_state` value the Handshake packet carries for this state.
    pub fn handshake_next(self) -> Option<i32> {
        match self {
            State::Status => Some(1),
            State::Login => Some(2),
            _ => None,
        }
    }

    pub(crate) fn from_u8(v: u8) -> State {
        match v {
            0 => State::Handshaking,
            1 => State::Status,
            2 => State::Login,
            3 => State::Configuration,
            _ => State::Play,
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            State::Handshaking => "Handshake",
            State::Status => "Status",
            State::Login => "Login",
            State::Configuration => "Configuration",
            State::Play => "Play",
        };
        f.write_str(s)
    }
}

/// Which way a packet travels. Also encoded in the type system: only
/// [`crate::ServerboundPacket`] encodes, only [`crate::ClientboundPacket`]
/// decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Serverbound,
    Clientbound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_next_mapping() {
        assert_eq!(State::from_handshake_next(1), Some(State::Status));
        assert_eq!(State::from_handshake_next(2), Some(State::Login));
        assert_eq!(State::from_handshake_next(0), None);
        assert_eq!(State::from_handshake_next(3), None);
        assert_eq!(State::Status.handshake_next(), Some(1));
        assert_eq!(State::Login.handshake_next(), Some(2));
        assert_eq!(State::Play.handshake_next(), None);
    }
}
