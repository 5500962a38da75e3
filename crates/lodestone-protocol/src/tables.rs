//! Per-version packet-id tables.
//!
//! This is generated data in spirit: the slices below transcribe the wire
//! tables for each version that moved an id we speak. Versions absent here
//! inherit the nearest earlier table (see `registry::definition`).

use crate::packets::{ClientboundKind as C, ServerboundKind as S};
use crate::registry::Definition;
use crate::state::State;
use crate::version::Version;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Handshake, Status and Login ids never moved across the supported range.
fn pre_play(def: &mut Definition) {
    def.serverbound(State::Handshaking, 0x00, S::Handshake);

    def.serverbound(State::Status, 0x00, S::StatusRequest);
    def.serverbound(State::Status, 0x01, S::Ping);
    def.clientbound(State::Status, 0x00, C::StatusResponse);
    def.clientbound(State::Status, 0x01, C::Pong);

    def.serverbound(State::Login, 0x00, S::LoginStart);
    def.clientbound(State::Login, 0x00, C::Disconnect);
    def.clientbound(State::Login, 0x02, C::LoginSuccess);
    def.clientbound(State::Login, 0x03, C::SetCompression);
}

/// The Configuration tables introduced by the 1.20.2 reconfiguration split.
fn configuration_1_20_2(def: &mut Definition) {
    def.serverbound(State::Login, 0x03, S::LoginAcknowledged);

    def.serverbound(State::Configuration, 0x00, S::ClientSettings);
    def.serverbound(State::Configuration, 0x01, S::CustomPayload);
    def.serverbound(State::Configuration, 0x02, S::FinishConfiguration);
    def.serverbound(State::Configuration, 0x03, S::ConfigKeepAlive);
    def.serverbound(State::Configuration, 0x04, S::ConfigPong);

    def.clientbound(State::Configuration, 0x00, C::CustomPayload);
    def.clientbound(State::Configuration, 0x01, C::Disconnect);
    def.clientbound(State::Configuration, 0x02, C::FinishConfiguration);
    def.clientbound(State::Configuration, 0x03, C::ConfigKeepAlive);
    def.clientbound(State::Configuration, 0x04, C::ConfigPing);
    def.clientbound(State::Configuration, 0x05, C::RegistryData);
    def.clientbound(State::Configuration, 0x07, C::FeatureFlags);
    def.clientbound(State::Configuration, 0x08, C::UpdateTags);
}

/// 1.20.5 inserted cookies and known packs, shifting most Configuration ids.
fn configuration_1_20_5(def: &mut Definition) {
    def.serverbound(State::Login, 0x03, S::LoginAcknowledged);

    def.serverbound(State::Configuration, 0x00, S::ClientSettings);
    def.serverbound(State::Configuration, 0x01, S::CookieResponse);
    def.serverbound(State::Configuration, 0x02, S::CustomPayload);
    def.serverbound(State::Configuration, 0x03, S::FinishConfiguration);
    def.serverbound(State::Configuration, 0x04, S::ConfigKeepAlive);
    def.serverbound(State::Configuration, 0x05, S::ConfigPong);
    def.serverbound(State::Configuration, 0x07, S::SelectKnownPacks);

    def.clientbound(State::Configuration, 0x00, C::CookieRequest);
    def.clientbound(State::Configuration, 0x01, C::CustomPayload);
    def.clientbound(State::Configuration, 0x02, C::Disconnect);
    def.clientbound(State::Configuration, 0x03, C::FinishConfiguration);
    def.clientbound(State::Configuration, 0x04, C::ConfigKeepAlive);
    def.clientbound(State::Configuration, 0x05, C::ConfigPing);
    def.clientbound(State::Configuration, 0x07, C::RegistryData);
    def.clientbound(State::Configuration, 0x0C, C::FeatureFlags);
    def.clientbound(State::Configuration, 0x0D, C::UpdateTags);
    def.clientbound(State::Configuration, 0x0E, C::SelectKnownPacks);
}

struct PlayIds {
    cb_chat: i32,
    cb_keep_alive: i32,
    cb_join_game: i32,
    cb_disconnect: i32,
    sb_chat: i32,
    sb_settings: i32,
    sb_keep_alive: i32,
    sb_position: i32,
}

fn play(def: &mut Definition, ids: PlayIds) {
    def.clientbound(State::Play, ids.cb_chat, C::ChatMessage);
    def.clientbound(State::Play, ids.cb_keep_alive, C::KeepAlive);
    def.clientbound(State::Play, ids.cb_join_game, C::JoinGame);
    def.clientbound(State::Play, ids.cb_disconnect, C::Disconnect);

    def.serverbound(State::Play, ids.sb_chat, S::ChatMessage);
    def.serverbound(State::Play, ids.sb_settings, S::ClientSettings);
    def.serverbound(State::Play, ids.sb_keep_alive, S::KeepAlive);
    def.serverbound(State::Play, ids.sb_position, S::PlayerPosition);
}

pub(crate) fn base_definitions() -> BTreeMap<Version, Arc<Definition>> {
    let mut defs = BTreeMap::new();
    let mut declare = |version: Version,
                       config: Option<fn(&mut Definition)>,
                       ids: PlayIds| {
        let mut def = Definition::new();
        pre_play(&mut def);
        if let Some(config) = config {
            config(&mut def);
        }
        play(&mut def, ids);
        defs.insert(version, Arc::new(def));
    };

    declare(
        Version::V1_7_2,
        None,
        PlayIds {
            cb_keep_alive: 0x00,
            cb_join_game: 0x01,
            cb_chat: 0x02,
            cb_disconnect: 0x40,
            sb_keep_alive: 0x00,
            sb_chat: 0x01,
            sb_position: 0x06,
            sb_settings: 0x15,
        },
    );

    declare(
        Version::V1_9,
        None,
        PlayIds {
            cb_chat: 0x0F,
            cb_disconnect: 0x1A,
            cb_keep_alive: 0x1F,
            cb_join_game: 0x23,
            sb_chat: 0x02,
            sb_settings: 0x04,
            sb_keep_alive: 0x0B,
            sb_position: 0x0D,
        },
    );

    declare(
        Version::V1_12,
        None,
        PlayIds {
            cb_chat: 0x0F,
            cb_disconnect: 0x1A,
            cb_keep_alive: 0x1F,
            cb_join_game: 0x23,
            sb_chat: 0x03,
            sb_settings: 0x05,
            sb_keep_alive: 0x0C,
            sb_position: 0x0F,
        },
    );

    declare(
        Version::V1_12_1,
        None,
        PlayIds {
            cb_chat: 0x0F,
            cb_disconnect: 0x1A,
            cb_keep_alive: 0x1F,
            cb_join_game: 0x23,
            sb_chat: 0x02,
            sb_settings: 0x04,
            sb_keep_alive: 0x0B,
            sb_position: 0x0E,
        },
    );

    declare(
        Version::V1_13,
        None,
        PlayIds {
            cb_chat: 0x0E,
            cb_disconnect: 0x1B,
            cb_keep_alive: 0x21,
            cb_join_game: 0x25,
            sb_chat: 0x02,
            sb_settings: 0x04,
            sb_keep_alive: 0x0E,
            sb_position: 0x11,
        },
    );

    declare(
        Version::V1_14,
        None,
        PlayIds {
            cb_chat: 0x0E,
            cb_disconnect: 0x1A,
            cb_keep_alive: 0x20,
            cb_join_game: 0x25,
            sb_chat: 0x03,
            sb_settings: 0x05,
            sb_keep_alive: 0x0F,
            sb_position: 0x12,
        },
    );

    declare(
        Version::V1_15,
        None,
        PlayIds {
            cb_chat: 0x0F,
            cb_disconnect: 0x1B,
            cb_keep_alive: 0x21,
            cb_join_game: 0x26,
            sb_chat: 0x03,
            sb_settings: 0x05,
            sb_keep_alive: 0x0F,
            sb_position: 0x12,
        },
    );

    declare(
        Version::V1_16,
        None,
        PlayIds {
            cb_chat: 0x0E,
            cb_disconnect: 0x1A,
            cb_keep_alive: 0x20,
            cb_join_game: 0x25,
            sb_chat: 0x03,
            sb_settings: 0x05,
            sb_keep_alive: 0x10,
            sb_position: 0x13,
        },
    );

    declare(
        Version::V1_16_2,
        None,
        PlayIds {
            cb_chat: 0x0E,
            cb_disconnect: 0x19,
            cb_keep_alive: 0x1F,
            cb_join_game: 0x24,
            sb_chat: 0x03,
            sb_settings: 0x05,
            sb_keep_alive: 0x10,
            sb_position: 0x13,
        },
    );

    declare(
        Version::V1_17,
        None,
        PlayIds {
            cb_chat: 0x0F,
            cb_disconnect: 0x1A,
            cb_keep_alive: 0x21,
            cb_join_game: 0x26,
            sb_chat: 0x03,
            sb_settings: 0x05,
            sb_keep_alive: 0x0F,
            sb_position: 0x12,
        },
    );

    declare(
        Version::V1_19,
        None,
        PlayIds {
            cb_disconnect: 0x17,
            cb_keep_alive: 0x1E,
            cb_join_game: 0x23,
            cb_chat: 0x30,
            sb_chat: 0x04,
            sb_settings: 0x07,
            sb_keep_alive: 0x11,
            sb_position: 0x14,
        },
    );

    declare(
        Version::V1_19_2,
        None,
        PlayIds {
            cb_disconnect: 0x19,
            cb_keep_alive: 0x20,
            cb_join_game: 0x25,
            cb_chat: 0x33,
            sb_chat: 0x05,
            sb_settings: 0x08,
            sb_keep_alive: 0x12,
            sb_position: 0x15,
        },
    );

    declare(
        Version::V1_19_3,
        None,
        PlayIds {
            cb_disconnect: 0x17,
            cb_keep_alive: 0x1F,
            cb_join_game: 0x24,
            cb_chat: 0x31,
            sb_chat: 0x05,
            sb_settings: 0x07,
            sb_keep_alive: 0x11,
            sb_position: 0x14,
        },
    );

    declare(
        Version::V1_19_4,
        None,
        PlayIds {
            cb_disconnect: 0x1A,
            cb_keep_alive: 0x23,
            cb_join_game: 0x28,
            cb_chat: 0x35,
            sb_chat: 0x05,
            sb_settings: 0x08,
            sb_keep_alive: 0x12,
            sb_position: 0x15,
        },
    );

    declare(
        Version::V1_20_2,
        Some(configuration_1_20_2),
        PlayIds {
            cb_disconnect: 0x1B,
            cb_keep_alive: 0x24,
            cb_join_game: 0x29,
            cb_chat: 0x37,
            sb_chat: 0x05,
            sb_settings: 0x09,
            sb_keep_alive: 0x14,
            sb_position: 0x17,
        },
    );

    declare(
        Version::V1_20_5,
        Some(configuration_1_20_5),
        PlayIds {
            cb_disconnect: 0x1D,
            cb_keep_alive: 0x26,
            cb_join_game: 0x2B,
            cb_chat: 0x39,
            sb_chat: 0x06,
            sb_settings: 0x0A,
            sb_keep_alive: 0x18,
            sb_position: 0x1B,
        },
    );

    declare(
        Version::V1_21_3,
        Some(configuration_1_20_5),
        PlayIds {
            cb_disconnect: 0x1D,
            cb_keep_alive: 0x26,
            cb_join_game: 0x2B,
            cb_chat: 0x3A,
            sb_chat: 0x07,
            sb_settings: 0x0C,
            sb_keep_alive: 0x1A,
            sb_position: 0x1D,
        },
    );

    declare(
        Version::V1_21_5,
        Some(configuration_1_20_5),
        PlayIds {
            cb_disconnect: 0x1C,
            cb_keep_alive: 0x26,
            cb_join_game: 0x2B,
            cb_chat: 0x3A,
            sb_chat: 0x07,
            sb_settings: 0x0C,
            sb_keep_alive: 0x1A,
            sb_position: 0x1D,
        },
    );

    defs
}
