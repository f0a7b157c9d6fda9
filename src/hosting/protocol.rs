use crate::Funds;
use crate::PlayerUuid;
use crate::RoomId;
use crate::game::Action;
use crate::game::Event;
use crate::game::Player;
use crate::game::RoomConfig;
use crate::game::Snapshot;
use crate::game::Trade;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Errors that can occur while decoding client frames.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    Malformed(String),
    NotInRoom,
    AlreadyInRoom,
    WrongRoom,
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed message: {}", s),
            Self::NotInRoom => write!(f, "join a room first"),
            Self::AlreadyInRoom => write!(f, "already in a room"),
            Self::WrongRoom => write!(f, "message targets a different room"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Messages sent from client to server over WebSocket.
/// Every action is room-scoped; the acting identity is the connection.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        room_id: RoomId,
        settings: RoomConfig,
        username: String,
        player_uuid: PlayerUuid,
    },
    JoinRoom {
        room_id: RoomId,
        username: String,
        player_uuid: PlayerUuid,
    },
    StartGame {
        room_id: RoomId,
    },
    RollDice {
        room_id: RoomId,
    },
    BuyProperty {
        room_id: RoomId,
        property_id: String,
    },
    EndTurn {
        room_id: RoomId,
    },
    DeclareBankrupt {
        room_id: RoomId,
        target_uuid: PlayerUuid,
    },
    UpdateSettings {
        room_id: RoomId,
        settings: RoomConfig,
    },
    KickPlayer {
        room_id: RoomId,
        target_uuid: PlayerUuid,
    },
    CreateTrade {
        room_id: RoomId,
        to_player_uuid: PlayerUuid,
        money_offered: Funds,
        money_requested: Funds,
        properties_offered: BTreeSet<String>,
        properties_requested: BTreeSet<String>,
    },
    AcceptTrade {
        room_id: RoomId,
        trade_id: uuid::Uuid,
    },
    RejectTrade {
        room_id: RoomId,
        trade_id: uuid::Uuid,
    },
    RequestGameState {
        room_id: RoomId,
    },
    RequestTrades {
        room_id: RoomId,
    },
    StateAcknowledged {
        room_id: RoomId,
    },
}

impl ClientMessage {
    /// The room this message targets.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::CreateRoom { room_id, .. }
            | Self::JoinRoom { room_id, .. }
            | Self::StartGame { room_id }
            | Self::RollDice { room_id }
            | Self::BuyProperty { room_id, .. }
            | Self::EndTurn { room_id }
            | Self::DeclareBankrupt { room_id, .. }
            | Self::UpdateSettings { room_id, .. }
            | Self::KickPlayer { room_id, .. }
            | Self::CreateTrade { room_id, .. }
            | Self::AcceptTrade { room_id, .. }
            | Self::RejectTrade { room_id, .. }
            | Self::RequestGameState { room_id }
            | Self::RequestTrades { room_id }
            | Self::StateAcknowledged { room_id } => room_id,
        }
    }
    /// Convert into an in-room action. Create/join are session-binding
    /// operations handled by the bridge, not room actions.
    pub fn action(self) -> Option<Action> {
        match self {
            Self::CreateRoom { .. } | Self::JoinRoom { .. } => None,
            Self::StartGame { .. } => Some(Action::Start),
            Self::RollDice { .. } => Some(Action::Roll),
            Self::BuyProperty { property_id, .. } => Some(Action::Buy { space: property_id }),
            Self::EndTurn { .. } => Some(Action::EndTurn),
            Self::DeclareBankrupt { target_uuid, .. } => {
                Some(Action::Bankrupt { target: target_uuid })
            }
            Self::UpdateSettings { settings, .. } => {
                Some(Action::UpdateSettings { config: settings })
            }
            Self::KickPlayer { target_uuid, .. } => Some(Action::Kick { target: target_uuid }),
            Self::CreateTrade {
                to_player_uuid,
                money_offered,
                money_requested,
                properties_offered,
                properties_requested,
                ..
            } => Some(Action::ProposeTrade {
                counterparty: to_player_uuid,
                funds_offered: money_offered,
                funds_requested: money_requested,
                spaces_offered: properties_offered,
                spaces_requested: properties_requested,
            }),
            Self::AcceptTrade { trade_id, .. } => Some(Action::AcceptTrade { trade: trade_id }),
            Self::RejectTrade { trade_id, .. } => Some(Action::RejectTrade { trade: trade_id }),
            Self::RequestGameState { .. } => Some(Action::RequestState),
            Self::RequestTrades { .. } => Some(Action::RequestTrades),
            Self::StateAcknowledged { .. } => Some(Action::Ack),
        }
    }
}

/// Messages sent from server to client over WebSocket.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated {
        room_id: RoomId,
    },
    JoinConfirmed,
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: PlayerUuid,
        name: String,
    },
    WaitingStatus {
        waiting_for_players: bool,
        current_players: usize,
        max_players: usize,
    },
    GameStarted,
    GameState {
        #[serde(flatten)]
        state: Snapshot,
    },
    DiceRolled {
        dice1: u8,
        dice2: u8,
        player_id: PlayerUuid,
    },
    PropertyAvailable {
        property_id: String,
        price: Funds,
        player_id: PlayerUuid,
    },
    PropertyBought {
        property_id: String,
        player_id: PlayerUuid,
    },
    TurnChanged {
        next_player_index: usize,
    },
    GameMessage {
        text: String,
    },
    Bankrupt {
        player_id: PlayerUuid,
        name: String,
    },
    PlayerKicked {
        player_id: PlayerUuid,
        name: String,
    },
    TradeCreated {
        trade: Trade,
        from_player_name: String,
        to_player_name: String,
    },
    TradeAccepted {
        trade_id: uuid::Uuid,
        message: String,
    },
    TradeRejected {
        trade_id: uuid::Uuid,
        message: String,
    },
    TradesUpdated {
        trades: Vec<Trade>,
    },
    SettingsUpdated {
        settings: RoomConfig,
    },
    Error {
        message: String,
    },
    GameEnded {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

/// The protocol layer between internal events and wire format.
pub struct Protocol;

impl Protocol {
    /// Converts an internal room event to a wire message.
    pub fn encode(event: &Event) -> ServerMessage {
        match event {
            Event::JoinConfirmed => ServerMessage::JoinConfirmed,
            Event::PlayerJoined(player) => ServerMessage::PlayerJoined {
                player: player.clone(),
            },
            Event::PlayerLeft { player, name } => ServerMessage::PlayerLeft {
                player_id: *player,
                name: name.clone(),
            },
            Event::Waiting {
                waiting,
                current,
                max,
            } => ServerMessage::WaitingStatus {
                waiting_for_players: *waiting,
                current_players: *current,
                max_players: *max,
            },
            Event::Started => ServerMessage::GameStarted,
            Event::State(snapshot) => ServerMessage::GameState {
                state: snapshot.clone(),
            },
            Event::DiceRolled(roll) => ServerMessage::DiceRolled {
                dice1: roll.d1,
                dice2: roll.d2,
                player_id: roll.roller,
            },
            Event::PropertyAvailable {
                space,
                price,
                player,
            } => ServerMessage::PropertyAvailable {
                property_id: space.clone(),
                price: *price,
                player_id: *player,
            },
            Event::PropertyBought { space, player } => ServerMessage::PropertyBought {
                property_id: space.clone(),
                player_id: *player,
            },
            Event::TurnChanged { next } => ServerMessage::TurnChanged {
                next_player_index: *next,
            },
            Event::Message(text) => ServerMessage::GameMessage { text: text.clone() },
            Event::Bankrupt { player, name } => ServerMessage::Bankrupt {
                player_id: *player,
                name: name.clone(),
            },
            Event::Kicked { player, name } => ServerMessage::PlayerKicked {
                player_id: *player,
                name: name.clone(),
            },
            Event::TradeCreated {
                trade,
                proposer,
                counterparty,
            } => ServerMessage::TradeCreated {
                trade: trade.clone(),
                from_player_name: proposer.clone(),
                to_player_name: counterparty.clone(),
            },
            Event::TradeAccepted { trade, message } => ServerMessage::TradeAccepted {
                trade_id: *trade,
                message: message.clone(),
            },
            Event::TradeRejected { trade, message } => ServerMessage::TradeRejected {
                trade_id: *trade,
                message: message.clone(),
            },
            Event::TradesUpdated(trades) => ServerMessage::TradesUpdated {
                trades: trades.clone(),
            },
            Event::SettingsUpdated(settings) => ServerMessage::SettingsUpdated {
                settings: *settings,
            },
            Event::Ended { message } => ServerMessage::GameEnded {
                message: message.clone(),
            },
        }
    }
    /// Parses a client frame.
    pub fn decode(s: &str) -> Result<ClientMessage, ProtocolError> {
        serde_json::from_str(s).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_roll_dice() {
        let msg = Protocol::decode(r#"{"type":"roll_dice","room_id":"abc"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::RollDice { .. }));
        assert_eq!(msg.room_id(), "abc");
        assert!(matches!(msg.action(), Some(Action::Roll)));
    }
    #[test]
    fn decode_create_room() {
        let msg = Protocol::decode(
            r#"{
                "type": "create_room",
                "room_id": "abc",
                "settings": {"max_players": 4, "starting_funds": 1500, "pool_entry": 0},
                "username": "alice",
                "player_uuid": "00000000-0000-0000-0000-000000000001"
            }"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::CreateRoom { .. }));
        assert!(msg.action().is_none()); // session-binding, not a room action
    }
    #[test]
    fn decode_rejects_unknown_and_malformed() {
        assert!(Protocol::decode(r#"{"type":"sell_property","room_id":"abc"}"#).is_err());
        assert!(Protocol::decode("not json").is_err());
    }
    #[test]
    fn encode_tags_snake_case() {
        let json = Protocol::encode(&Event::Started).to_json();
        assert_eq!(json, r#"{"type":"game_started"}"#);
        let json = Protocol::encode(&Event::Message("hi".to_string())).to_json();
        assert!(json.contains(r#""type":"game_message""#));
    }
    #[test]
    fn error_message_round_trip() {
        let json = ServerMessage::error("Room not found").to_json();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains("Room not found"));
    }
}
