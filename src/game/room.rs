use super::*;
use crate::BOARD_LENGTH;
use crate::Funds;
use crate::JAIL_POSITION;
use crate::LAND_START_BONUS;
use crate::MAX_JAIL_ATTEMPTS;
use crate::PASS_START_BONUS;
use crate::PlayerUuid;
use crate::Position;
use crate::RoomId;
use crate::SessionId;
use crate::board::Board;
use crate::board::SpaceKind;
use crate::board::surprise_deck;
use crate::board::treasure_deck;

/// Piece colors assigned by join order.
const COLORS: &[&str] = &[
    "#FF0000", "#0000FF", "#00AA00", "#FF8800", "#AA00AA", "#00AAAA", "#884400", "#FF00AA",
];

/// One isolated game instance: the aggregate root owning players, board
/// ownership, the turn pointer, and pending trades.
///
/// Rooms are plain values driven by a single caller at a time; the hosting
/// actor serializes all mutation, so nothing here locks. Every operation
/// validates its preconditions before mutating anything and returns the
/// scoped events to deliver, or a [`GameError`] for the caller alone.
pub struct Room {
    id: RoomId,
    config: RoomConfig,
    players: Vec<Player>,
    board: Board,
    current: usize,
    started: bool,
    finished: bool,
    last_roll: Option<LastRoll>,
    trades: Vec<Trade>,
    dice: Box<dyn Dice>,
}

impl Room {
    pub fn new(id: RoomId, config: RoomConfig, dice: Box<dyn Dice>) -> Self {
        Self {
            id,
            config,
            players: Vec::new(),
            board: Board::standard(),
            current: 0,
            started: false,
            finished: false,
            last_roll: None,
            trades: Vec::new(),
            dice,
        }
    }
    pub fn id(&self) -> &RoomId {
        &self.id
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }
    pub fn current(&self) -> usize {
        self.current
    }
    pub fn started(&self) -> bool {
        self.started
    }
    pub fn finished(&self) -> bool {
        self.finished
    }
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
    /// Full room projection for state re-sync broadcasts.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            room: self.id.clone(),
            config: self.config,
            players: self.players.clone(),
            current: self.current,
            started: self.started,
            last_roll: self.last_roll,
            spaces: self.board.spaces().to_vec(),
            trades: self.trades.clone(),
        }
    }
}

// Session reconciliation: join, reconnect, leave.
impl Room {
    /// Add a participant, or rebind an existing one after reconnect.
    ///
    /// A `uuid` already present in the room means reconnection: the
    /// ephemeral session is rebound and no new entity is created. The
    /// first player into a fresh room becomes the leader.
    pub fn join(
        &mut self,
        session: SessionId,
        name: &str,
        uuid: PlayerUuid,
    ) -> Result<Vec<Scoped>, GameError> {
        if let Some(player) = self.players.iter_mut().find(|p| p.uuid == uuid) {
            player.session = session;
            log::info!("[room {}] {} reconnected", self.id, player.name);
            return Ok(vec![
                Event::JoinConfirmed.reply(),
                Event::State(self.snapshot()).broadcast(),
            ]);
        }
        if self.started {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() >= self.config.max_players {
            return Err(GameError::RoomFull);
        }
        let color = COLORS[self.players.len() % COLORS.len()];
        let leader = self.players.is_empty();
        let player = Player::new(session, uuid, name, color, leader, self.config.starting_funds);
        self.players.push(player.clone());
        log::info!(
            "[room {}] {} joined ({}/{})",
            self.id,
            name,
            self.players.len(),
            self.config.max_players
        );
        Ok(vec![
            Event::PlayerJoined(player).broadcast(),
            Event::JoinConfirmed.reply(),
            Event::State(self.snapshot()).broadcast(),
            self.waiting().broadcast(),
        ])
    }
    /// Remove the participant bound to a dropped session.
    ///
    /// Leadership is promoted to the longest-joined survivor so a room is
    /// never left leaderless. An empty room is reaped by the registry.
    pub fn leave(&mut self, session: SessionId) -> Vec<Scoped> {
        let Some(index) = self.players.iter().position(|p| p.session == session) else {
            return Vec::new();
        };
        let player = self.players.remove(index);
        log::info!("[room {}] {} left", self.id, player.name);
        if self.players.is_empty() {
            return Vec::new();
        }
        if self.current >= self.players.len() {
            self.current = 0;
        }
        let mut events = vec![
            Event::PlayerLeft {
                player: player.uuid,
                name: player.name.clone(),
            }
            .broadcast(),
        ];
        if !self.players.iter().any(|p| p.is_leader) {
            let heir = &mut self.players[0];
            heir.is_leader = true;
            events.push(
                Event::Message(format!("{} is now the room leader", heir.name)).broadcast(),
            );
        }
        if !self.started {
            events.push(self.waiting().broadcast());
        }
        events.push(Event::State(self.snapshot()).broadcast());
        events
    }
    fn waiting(&self) -> Event {
        Event::Waiting {
            waiting: !self.started && self.players.len() < self.config.max_players,
            current: self.players.len(),
            max: self.config.max_players,
        }
    }
}

// Action dispatch.
impl Room {
    /// Validate and apply one action for the given session.
    /// Precondition failures never mutate state and are never broadcast.
    pub fn dispatch(&mut self, session: SessionId, action: Action) -> Result<Vec<Scoped>, GameError> {
        log::debug!("[room {}] session {} -> {}", self.id, session, action);
        match action {
            Action::Start => self.start(session),
            Action::Roll => self.roll(session),
            Action::Buy { space } => self.buy(session, &space),
            Action::EndTurn => self.end_turn(session),
            Action::Bankrupt { target } => self.bankrupt(session, target),
            Action::UpdateSettings { config } => self.update_settings(session, config),
            Action::Kick { target } => self.kick(session, target),
            Action::ProposeTrade {
                counterparty,
                funds_offered,
                funds_requested,
                spaces_offered,
                spaces_requested,
            } => self.propose(
                session,
                counterparty,
                funds_offered,
                funds_requested,
                spaces_offered,
                spaces_requested,
            ),
            Action::AcceptTrade { trade } => self.accept(session, trade),
            Action::RejectTrade { trade } => self.reject(session, trade),
            Action::RequestState => Ok(vec![Event::State(self.snapshot()).reply()]),
            Action::RequestTrades => Ok(vec![Event::TradesUpdated(self.trades.clone()).reply()]),
            Action::Ack => Ok(vec![self.waiting().reply()]),
        }
    }
    fn seat(&self, session: SessionId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.session == session)
            .ok_or(GameError::PlayerNotFound)
    }
    /// The acting session must hold the turn in a running game.
    fn acting(&self, session: SessionId) -> Result<usize, GameError> {
        if !self.started || self.finished {
            return Err(GameError::GameNotStarted);
        }
        let index = self.seat(session)?;
        if index != self.current {
            return Err(GameError::NotYourTurn);
        }
        Ok(index)
    }
    fn leader(&self, session: SessionId) -> Result<usize, GameError> {
        let index = self.seat(session)?;
        if !self.players[index].is_leader {
            return Err(GameError::NotLeader);
        }
        Ok(index)
    }
}

// Turn lifecycle.
impl Room {
    fn start(&mut self, session: SessionId) -> Result<Vec<Scoped>, GameError> {
        self.seat(session)?;
        if self.started {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() < RoomConfig::MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        self.started = true;
        self.current = 0;
        // funds re-normalize on start, discarding pre-start adjustments
        for player in self.players.iter_mut() {
            player.has_rolled = false;
            player.funds = self.config.starting_funds;
        }
        log::info!("[room {}] game started with {} players", self.id, self.players.len());
        Ok(vec![
            Event::Started.broadcast(),
            Event::State(self.snapshot()).broadcast(),
        ])
    }
    fn end_turn(&mut self, session: SessionId) -> Result<Vec<Scoped>, GameError> {
        let index = self.acting(session)?;
        if !self.players[index].has_rolled {
            return Err(GameError::MustRollFirst);
        }
        self.players[index].has_rolled = false;
        self.last_roll = None;
        // the only place bankruptcy removes a player from the rotation
        let count = self.players.len();
        let mut next = (self.current + 1) % count;
        let mut laps = 0;
        while self.players[next].bankrupt {
            next = (next + 1) % count;
            laps += 1;
            if laps >= count {
                self.finished = true;
                log::info!("[room {}] all players bankrupt, game over", self.id);
                return Ok(vec![
                    Event::Ended {
                        message: "All players are bankrupt. Game over.".to_string(),
                    }
                    .broadcast(),
                ]);
            }
        }
        self.current = next;
        Ok(vec![
            Event::TurnChanged { next }.broadcast(),
            Event::State(self.snapshot()).broadcast(),
        ])
    }
}

// Dice resolution pipeline: roll -> move -> space effect.
impl Room {
    fn roll(&mut self, session: SessionId) -> Result<Vec<Scoped>, GameError> {
        let index = self.acting(session)?;
        if self.players[index].has_rolled {
            return Err(GameError::AlreadyRolled);
        }
        let (d1, d2) = self.dice.roll();
        let total = (d1 + d2) as Position;
        let doubles = d1 == d2;
        let roll = LastRoll {
            d1,
            d2,
            roller: self.players[index].uuid,
        };
        let mut events = Vec::new();
        let player = &mut self.players[index];
        if player.in_jail {
            if doubles || player.jail_attempts >= MAX_JAIL_ATTEMPTS {
                player.in_jail = false;
                player.jail_attempts = 0;
                player.position = (player.position + total) % BOARD_LENGTH;
                events.push(
                    Event::Message(format!(
                        "{} rolled {}+{} and got out of jail!",
                        player.name, d1, d2
                    ))
                    .broadcast(),
                );
            } else {
                // a jail-stuck roll consumes the turn without a landing
                player.jail_attempts += 1;
                player.has_rolled = true;
                let attempts = player.jail_attempts;
                events.push(
                    Event::Message(format!(
                        "{} rolled {}+{} but is still in jail ({}/3 tries)",
                        player.name, d1, d2, attempts
                    ))
                    .broadcast(),
                );
                self.last_roll = Some(roll);
                events.push(Event::DiceRolled(roll).broadcast());
                events.push(Event::State(self.snapshot()).broadcast());
                return Ok(events);
            }
        } else {
            let passed = player.position + total >= BOARD_LENGTH;
            player.position = (player.position + total) % BOARD_LENGTH;
            if passed {
                player.funds += PASS_START_BONUS;
            }
            // stacks with the passing bonus when landing exactly on Start
            if player.position == 0 {
                player.funds += LAND_START_BONUS;
            }
        }
        events.extend(self.land(index, d1, d2));
        self.players[index].has_rolled = true;
        self.last_roll = Some(roll);
        events.push(Event::DiceRolled(roll).broadcast());
        events.push(Event::State(self.snapshot()).broadcast());
        Ok(events)
    }
    /// Resolve the effect of the space the mover now stands on.
    fn land(&mut self, index: usize, d1: u8, d2: u8) -> Vec<Scoped> {
        let position = self.players[index].position;
        let kind = self.board.at(position).kind;
        match kind {
            SpaceKind::GoToJail => {
                let player = &mut self.players[index];
                player.position = JAIL_POSITION;
                player.in_jail = true;
                player.jail_attempts = 0;
                vec![
                    Event::Message(format!(
                        "{} landed on Go To Jail! Sent to jail at space {}.",
                        player.name, JAIL_POSITION
                    ))
                    .broadcast(),
                ]
            }
            SpaceKind::Vacation => {
                let payout = self.board.at(position).pool;
                self.board.at_mut(position).pool = 0;
                let player = &mut self.players[index];
                player.funds += payout;
                vec![
                    Event::Message(format!(
                        "{} received ${} for vacation!",
                        player.name, payout
                    ))
                    .broadcast(),
                ]
            }
            SpaceKind::Tax => {
                let amount = self.board.at(position).price();
                self.players[index].funds -= amount;
                // tax revenue funds the vacation payouts
                self.board.vacation_mut().pool += amount;
                vec![
                    Event::Message(format!(
                        "{} paid ${} in taxes.",
                        self.players[index].name, amount
                    ))
                    .broadcast(),
                ]
            }
            SpaceKind::Surprise => self.draw(index, surprise_deck()),
            SpaceKind::Treasure => self.draw(index, treasure_deck()),
            SpaceKind::Property | SpaceKind::Airport | SpaceKind::Utility => {
                self.visit(index, position)
            }
            SpaceKind::Start | SpaceKind::Corner => {
                let player = &self.players[index];
                let space = self.board.at(position);
                vec![
                    Event::Message(format!(
                        "{} rolled {}+{}={} and moved to space {}",
                        player.name,
                        d1,
                        d2,
                        d1 + d2,
                        space.name
                    ))
                    .broadcast(),
                ]
            }
        }
    }
    fn draw(&mut self, index: usize, deck: &[crate::board::Card]) -> Vec<Scoped> {
        let card = deck[self.dice.pick(deck.len())];
        card.apply(&mut self.players[index]);
        vec![Event::Message(card.text.to_string()).broadcast()]
    }
    /// Landing on a purchasable space: offer, charge rent, or nothing.
    fn visit(&mut self, index: usize, position: Position) -> Vec<Scoped> {
        let space = self.board.at(position);
        let mover = self.players[index].uuid;
        match space.owner {
            None => vec![
                Event::PropertyAvailable {
                    space: space.id.clone(),
                    price: space.price(),
                    player: mover,
                }
                .broadcast(),
            ],
            Some(owner) if owner == mover => Vec::new(),
            Some(owner) => {
                let rent = space.rent();
                let Some(landlord) = self.players.iter().position(|p| p.uuid == owner) else {
                    return Vec::new();
                };
                self.players[index].funds -= rent;
                self.players[landlord].funds += rent;
                vec![
                    Event::Message(format!(
                        "{} paid ${} in rent to {}",
                        self.players[index].name, rent, self.players[landlord].name
                    ))
                    .broadcast(),
                ]
            }
        }
    }
    fn buy(&mut self, session: SessionId, space_id: &str) -> Result<Vec<Scoped>, GameError> {
        let index = self.acting(session)?;
        let buyer = self.players[index].uuid;
        let space = self
            .board
            .by_id(space_id)
            .ok_or(GameError::SpaceNotFound)?;
        if !space.kind.purchasable() || space.owner.is_some() {
            return Err(GameError::NotAvailable);
        }
        let price = space.price();
        if self.players[index].funds < price {
            return Err(GameError::InsufficientFunds(
                "Not enough money to buy property".to_string(),
            ));
        }
        self.players[index].funds -= price;
        self.players[index].holdings.insert(space_id.to_string());
        let space = self.board.by_id_mut(space_id).ok_or(GameError::SpaceNotFound)?;
        space.owner = Some(buyer);
        log::info!("[room {}] {} bought {}", self.id, self.players[index].name, space_id);
        Ok(vec![
            Event::PropertyBought {
                space: space_id.to_string(),
                player: buyer,
            }
            .broadcast(),
            Event::State(self.snapshot()).broadcast(),
        ])
    }
    fn bankrupt(
        &mut self,
        session: SessionId,
        target: PlayerUuid,
    ) -> Result<Vec<Scoped>, GameError> {
        let index = self.seat(session)?;
        // a player may only declare their own bankruptcy
        if self.players[index].uuid != target {
            return Err(GameError::NotAuthorized(
                "You can only declare your own bankruptcy".to_string(),
            ));
        }
        self.players[index].go_bankrupt();
        self.board.release(target);
        log::info!("[room {}] {} went bankrupt", self.id, self.players[index].name);
        Ok(vec![
            Event::Bankrupt {
                player: target,
                name: self.players[index].name.clone(),
            }
            .broadcast(),
            Event::State(self.snapshot()).broadcast(),
        ])
    }
}

// Lobby administration.
impl Room {
    fn update_settings(
        &mut self,
        session: SessionId,
        config: RoomConfig,
    ) -> Result<Vec<Scoped>, GameError> {
        self.leader(session)?;
        if self.started {
            return Err(GameError::GameAlreadyStarted);
        }
        config.validate()?;
        if config.max_players < self.players.len() {
            return Err(GameError::InvalidSettings(
                "maxPlayers is below the current player count".to_string(),
            ));
        }
        self.config = config;
        Ok(vec![
            Event::SettingsUpdated(config).broadcast(),
            Event::State(self.snapshot()).broadcast(),
        ])
    }
    fn kick(&mut self, session: SessionId, target: PlayerUuid) -> Result<Vec<Scoped>, GameError> {
        self.leader(session)?;
        if self.started {
            return Err(GameError::GameAlreadyStarted);
        }
        let index = self
            .players
            .iter()
            .position(|p| p.uuid == target)
            .ok_or(GameError::PlayerNotFound)?;
        let kicked = self.players.remove(index);
        if self.current >= self.players.len() {
            self.current = 0;
        }
        log::info!("[room {}] {} was kicked", self.id, kicked.name);
        Ok(vec![
            Event::Kicked {
                player: kicked.uuid,
                name: kicked.name,
            }
            .broadcast(),
            self.waiting().broadcast(),
            Event::State(self.snapshot()).broadcast(),
        ])
    }
}

// Trade negotiation.
impl Room {
    fn propose(
        &mut self,
        session: SessionId,
        counterparty: PlayerUuid,
        funds_offered: Funds,
        funds_requested: Funds,
        spaces_offered: std::collections::BTreeSet<String>,
        spaces_requested: std::collections::BTreeSet<String>,
    ) -> Result<Vec<Scoped>, GameError> {
        let proposer = &self.players[self.seat(session)?];
        let other = self
            .players
            .iter()
            .find(|p| p.uuid == counterparty)
            .ok_or(GameError::PlayerNotFound)?;
        if funds_offered < 0 || funds_requested < 0 {
            return Err(GameError::InvalidSettings(
                "Trade amounts must be positive".to_string(),
            ));
        }
        if funds_offered > proposer.funds {
            return Err(GameError::InsufficientFunds(
                "Insufficient funds to offer".to_string(),
            ));
        }
        if funds_requested > other.funds {
            return Err(GameError::InsufficientFunds(
                "Target player has insufficient funds".to_string(),
            ));
        }
        if !spaces_offered.iter().all(|s| proposer.holdings.contains(s)) {
            return Err(GameError::NotAuthorized(
                "You don't own some of the offered properties".to_string(),
            ));
        }
        if !spaces_requested.iter().all(|s| other.holdings.contains(s)) {
            return Err(GameError::NotAuthorized(
                "Target player doesn't own some of the requested properties".to_string(),
            ));
        }
        let trade = Trade::new(
            proposer.uuid,
            counterparty,
            funds_offered,
            funds_requested,
            spaces_offered,
            spaces_requested,
        );
        let created = Event::TradeCreated {
            trade: trade.clone(),
            proposer: proposer.name.clone(),
            counterparty: other.name.clone(),
        };
        log::info!("[room {}] trade {} proposed", self.id, trade.id);
        self.trades.push(trade);
        Ok(vec![
            created.broadcast(),
            Event::TradesUpdated(self.trades.clone()).broadcast(),
        ])
    }
    fn accept(&mut self, session: SessionId, trade_id: uuid::Uuid) -> Result<Vec<Scoped>, GameError> {
        let trade = self
            .trades
            .iter()
            .find(|t| t.id == trade_id)
            .ok_or(GameError::TradeNotFound)?
            .clone();
        let caller = &self.players[self.seat(session)?];
        if caller.uuid != trade.counterparty {
            return Err(GameError::NotAuthorized(
                "You cannot accept this trade".to_string(),
            ));
        }
        if trade.status != TradeStatus::Pending {
            return Err(GameError::TradeClosed);
        }
        let from = self
            .players
            .iter()
            .position(|p| p.uuid == trade.proposer)
            .ok_or(GameError::PlayerNotFound)?;
        let to = self
            .players
            .iter()
            .position(|p| p.uuid == trade.counterparty)
            .ok_or(GameError::PlayerNotFound)?;
        // balances and holdings may have drifted since proposal: re-check
        if trade.funds_offered > self.players[from].funds {
            return Err(GameError::InsufficientFunds(
                "Offering player has insufficient funds".to_string(),
            ));
        }
        if trade.funds_requested > self.players[to].funds {
            return Err(GameError::InsufficientFunds(
                "You have insufficient funds".to_string(),
            ));
        }
        if !trade
            .spaces_offered
            .iter()
            .all(|s| self.players[from].holdings.contains(s))
        {
            return Err(GameError::NotAvailable);
        }
        if !trade
            .spaces_requested
            .iter()
            .all(|s| self.players[to].holdings.contains(s))
        {
            return Err(GameError::NotAvailable);
        }
        self.players[from].funds -= trade.funds_offered;
        self.players[to].funds += trade.funds_offered;
        self.players[to].funds -= trade.funds_requested;
        self.players[from].funds += trade.funds_requested;
        self.swap_spaces(&trade.spaces_offered, from, to);
        self.swap_spaces(&trade.spaces_requested, to, from);
        let message = format!(
            "{} accepted the trade from {}",
            self.players[to].name, self.players[from].name
        );
        self.trades.retain(|t| t.id != trade_id);
        log::info!("[room {}] trade {} accepted", self.id, trade_id);
        Ok(vec![
            Event::TradeAccepted {
                trade: trade_id,
                message,
            }
            .broadcast(),
            Event::TradesUpdated(self.trades.clone()).broadcast(),
            Event::State(self.snapshot()).broadcast(),
        ])
    }
    fn reject(&mut self, session: SessionId, trade_id: uuid::Uuid) -> Result<Vec<Scoped>, GameError> {
        let trade = self
            .trades
            .iter()
            .find(|t| t.id == trade_id)
            .ok_or(GameError::TradeNotFound)?
            .clone();
        let caller = &self.players[self.seat(session)?];
        if !trade.involves(caller.uuid) {
            return Err(GameError::NotAuthorized(
                "You cannot reject this trade".to_string(),
            ));
        }
        if trade.status != TradeStatus::Pending {
            return Err(GameError::TradeClosed);
        }
        let verb = if trade.proposer == caller.uuid {
            "cancelled"
        } else {
            "rejected"
        };
        let message = format!("{} {} the trade", caller.name, verb);
        self.trades.retain(|t| t.id != trade_id);
        log::info!("[room {}] trade {} {}", self.id, trade_id, verb);
        Ok(vec![
            Event::TradeRejected {
                trade: trade_id,
                message,
            }
            .broadcast(),
            Event::TradesUpdated(self.trades.clone()).broadcast(),
        ])
    }
    /// Move each space id from one player's holdings to the other's,
    /// keeping board ownership in sync.
    fn swap_spaces(&mut self, spaces: &std::collections::BTreeSet<String>, from: usize, to: usize) {
        let recipient = self.players[to].uuid;
        for id in spaces {
            self.players[from].holdings.remove(id);
            self.players[to].holdings.insert(id.clone());
            if let Some(space) = self.board.by_id_mut(id) {
                space.owner = Some(recipient);
            }
        }
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("id", &self.id)
            .field("players", &self.players.len())
            .field("current", &self.current)
            .field("started", &self.started)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const ALICE: SessionId = 1;
    const BOB: SessionId = 2;

    fn uuid(n: u128) -> PlayerUuid {
        uuid::Uuid::from_u128(n)
    }
    fn room(dice: Scripted) -> Room {
        let mut room = Room::new("t1".to_string(), RoomConfig::default(), Box::new(dice));
        room.join(ALICE, "alice", uuid(1)).unwrap();
        room.join(BOB, "bob", uuid(2)).unwrap();
        room
    }
    fn started(dice: Scripted) -> Room {
        let mut room = room(dice);
        room.dispatch(ALICE, Action::Start).unwrap();
        room
    }
    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_joiner_leads() {
        let room = room(Scripted::default());
        assert!(room.players()[0].is_leader);
        assert!(!room.players()[1].is_leader);
    }
    #[test]
    fn join_after_start_rejected() {
        let mut room = started(Scripted::default());
        assert_eq!(
            room.join(3, "carol", uuid(3)).unwrap_err(),
            GameError::GameAlreadyStarted
        );
    }
    #[test]
    fn join_past_capacity_rejected() {
        let mut config = RoomConfig::default();
        config.max_players = 2;
        let mut room = Room::new("t1".to_string(), config, Box::new(Scripted::default()));
        room.join(ALICE, "alice", uuid(1)).unwrap();
        room.join(BOB, "bob", uuid(2)).unwrap();
        assert_eq!(room.join(3, "carol", uuid(3)).unwrap_err(), GameError::RoomFull);
    }
    #[test]
    fn reconnect_rebinds_without_duplicating() {
        let mut room = started(Scripted::rolls(&[(3, 4)]));
        room.dispatch(ALICE, Action::Roll).unwrap();
        room.dispatch(ALICE, Action::Buy { space: "haifa".to_string() })
            .unwrap();
        let funds = room.players()[0].funds;
        let position = room.players()[0].position;
        let events = room.join(99, "alice", uuid(1)).unwrap();
        assert_eq!(room.players().len(), 2);
        assert_eq!(room.players()[0].session, 99);
        assert_eq!(room.players()[0].funds, funds);
        assert_eq!(room.players()[0].position, position);
        assert!(room.players()[0].holdings.contains("haifa"));
        assert!(matches!(events[0].event, Event::JoinConfirmed));
        assert_eq!(events[0].audience, Audience::Caller);
    }
    #[test]
    fn start_needs_two_players() {
        let mut room = Room::new(
            "t1".to_string(),
            RoomConfig::default(),
            Box::new(Scripted::default()),
        );
        room.join(ALICE, "alice", uuid(1)).unwrap();
        assert_eq!(
            room.dispatch(ALICE, Action::Start).unwrap_err(),
            GameError::NotEnoughPlayers
        );
    }
    #[test]
    fn start_renormalizes_funds() {
        let mut room = room(Scripted::default());
        // simulate a pre-start fund drift
        room.players[1].funds = 9999;
        room.dispatch(ALICE, Action::Start).unwrap();
        assert!(room.players().iter().all(|p| p.funds == 1500));
        assert_eq!(room.current(), 0);
    }
    #[test]
    fn roll_out_of_turn_rejected() {
        let mut room = started(Scripted::default());
        assert_eq!(
            room.dispatch(BOB, Action::Roll).unwrap_err(),
            GameError::NotYourTurn
        );
    }
    #[test]
    fn second_roll_in_turn_rejected() {
        let mut room = started(Scripted::rolls(&[(3, 4), (2, 2)]));
        room.dispatch(ALICE, Action::Roll).unwrap();
        assert_eq!(
            room.dispatch(ALICE, Action::Roll).unwrap_err(),
            GameError::AlreadyRolled
        );
    }
    #[test]
    fn seven_from_start_offers_unowned_property() {
        // position 7 is Haifa, priced 160
        let mut room = started(Scripted::rolls(&[(3, 4)]));
        let events = room.dispatch(ALICE, Action::Roll).unwrap();
        let player = &room.players()[0];
        assert_eq!(player.position, 7);
        assert_eq!(player.funds, 1500); // no bonus, no purchase yet
        assert!(events.iter().any(|s| matches!(
            &s.event,
            Event::PropertyAvailable { space, price, .. } if space == "haifa" && *price == 160
        )));
        assert!(room.board().by_id("haifa").unwrap().owner.is_none());
    }
    #[test]
    fn passing_start_credits_bonus() {
        let mut room = started(Scripted::rolls(&[(3, 4)]));
        room.players[0].position = 36;
        room.dispatch(ALICE, Action::Roll).unwrap();
        assert_eq!(room.players()[0].position, 3);
        assert_eq!(room.players()[0].funds, 1500 + PASS_START_BONUS);
    }
    #[test]
    fn landing_on_start_stacks_both_bonuses() {
        let mut room = started(Scripted::rolls(&[(3, 4)]));
        room.players[0].position = 33;
        room.dispatch(ALICE, Action::Roll).unwrap();
        assert_eq!(room.players()[0].position, 0);
        assert_eq!(
            room.players()[0].funds,
            1500 + PASS_START_BONUS + LAND_START_BONUS
        );
    }
    #[test]
    fn go_to_jail_space_jails() {
        let mut room = started(Scripted::rolls(&[(3, 4)]));
        room.players[0].position = 23;
        room.dispatch(ALICE, Action::Roll).unwrap();
        let player = &room.players()[0];
        assert_eq!(player.position, JAIL_POSITION);
        assert!(player.in_jail);
        assert_eq!(player.jail_attempts, 0);
    }
    #[test]
    fn failed_jail_roll_consumes_turn_without_landing() {
        let mut room = started(Scripted::rolls(&[(2, 5)]));
        room.players[0].in_jail = true;
        room.players[0].position = JAIL_POSITION;
        let events = room.dispatch(ALICE, Action::Roll).unwrap();
        let player = &room.players()[0];
        assert!(player.in_jail);
        assert_eq!(player.jail_attempts, 1);
        assert_eq!(player.position, JAIL_POSITION);
        assert!(player.has_rolled);
        // no landing resolution: no property offer on the way out
        assert!(!events
            .iter()
            .any(|s| matches!(s.event, Event::PropertyAvailable { .. })));
    }
    #[test]
    fn third_jail_attempt_always_releases() {
        let mut room = started(Scripted::rolls(&[(2, 5)]));
        room.players[0].in_jail = true;
        room.players[0].position = JAIL_POSITION;
        room.players[0].jail_attempts = 2;
        room.dispatch(ALICE, Action::Roll).unwrap();
        let player = &room.players()[0];
        assert!(!player.in_jail);
        assert_eq!(player.jail_attempts, 0);
        assert_eq!(player.position, JAIL_POSITION + 7);
    }
    #[test]
    fn doubles_release_from_jail() {
        let mut room = started(Scripted::rolls(&[(4, 4)]));
        room.players[0].in_jail = true;
        room.players[0].position = JAIL_POSITION;
        room.dispatch(ALICE, Action::Roll).unwrap();
        assert!(!room.players()[0].in_jail);
        assert_eq!(room.players()[0].position, 18);
    }
    #[test]
    fn tax_funds_vacation_pool() {
        let mut room = started(Scripted::rolls(&[(3, 4), (1, 2)]));
        room.players[0].position = 31; // 31 + 7 = 38, Luxury Tax (100)
        room.dispatch(ALICE, Action::Roll).unwrap();
        assert_eq!(room.players()[0].funds, 1400);
        assert_eq!(room.board().at(crate::VACATION_POSITION).pool, 100);
        // the next visitor collects the pool
        room.dispatch(ALICE, Action::EndTurn).unwrap();
        room.players[1].position = 17;
        room.dispatch(BOB, Action::Roll).unwrap();
        assert_eq!(room.players()[1].funds, 1600);
        assert_eq!(room.board().at(crate::VACATION_POSITION).pool, 0);
    }
    #[test]
    fn rent_moves_between_players() {
        let mut room = started(Scripted::rolls(&[(3, 4)]));
        room.players[1].holdings.insert("haifa".to_string());
        room.board.by_id_mut("haifa").unwrap().owner = Some(uuid(2));
        room.dispatch(ALICE, Action::Roll).unwrap();
        assert_eq!(room.players()[0].funds, 1500 - 16);
        assert_eq!(room.players()[1].funds, 1500 + 16);
    }
    #[test]
    fn card_draw_applies_scripted_effect() {
        // 8 is a surprise space; pick index 1 = "Go to Jail"
        let mut room = started(Scripted::rolls(&[(3, 5)]).with_picks(&[1]));
        let events = room.dispatch(ALICE, Action::Roll).unwrap();
        let player = &room.players()[0];
        assert!(player.in_jail);
        assert_eq!(player.position, JAIL_POSITION);
        assert!(events
            .iter()
            .any(|s| matches!(&s.event, Event::Message(m) if m == "Go to Jail")));
    }
    #[test]
    fn buy_requires_funds_and_vacancy() {
        let mut room = started(Scripted::rolls(&[(3, 4)]));
        room.dispatch(ALICE, Action::Roll).unwrap();
        room.players[0].funds = 100;
        assert!(matches!(
            room.dispatch(ALICE, Action::Buy { space: "haifa".to_string() }),
            Err(GameError::InsufficientFunds(_))
        ));
        room.players[0].funds = 1500;
        room.dispatch(ALICE, Action::Buy { space: "haifa".to_string() })
            .unwrap();
        let player = &room.players()[0];
        assert_eq!(player.funds, 1500 - 160);
        assert!(player.holdings.contains("haifa"));
        assert_eq!(room.board().by_id("haifa").unwrap().owner, Some(uuid(1)));
        // and never twice
        assert_eq!(
            room.dispatch(ALICE, Action::Buy { space: "haifa".to_string() })
                .unwrap_err(),
            GameError::NotAvailable
        );
    }
    #[test]
    fn end_turn_requires_a_roll() {
        let mut room = started(Scripted::default());
        assert_eq!(
            room.dispatch(ALICE, Action::EndTurn).unwrap_err(),
            GameError::MustRollFirst
        );
    }
    #[test]
    fn end_turn_skips_bankrupt_players() {
        let mut room = Room::new(
            "t1".to_string(),
            RoomConfig::default(),
            Box::new(Scripted::rolls(&[(1, 2), (1, 2)])),
        );
        room.join(ALICE, "alice", uuid(1)).unwrap();
        room.join(BOB, "bob", uuid(2)).unwrap();
        room.join(3, "carol", uuid(3)).unwrap();
        room.dispatch(ALICE, Action::Start).unwrap();
        room.dispatch(BOB, Action::Bankrupt { target: uuid(2) }).unwrap();
        room.dispatch(ALICE, Action::Roll).unwrap();
        room.dispatch(ALICE, Action::EndTurn).unwrap();
        assert_eq!(room.current(), 2); // bob at index 1 skipped
        assert!(room.players()[0].position > 0); // invariant: current indexes non-bankrupt
        assert!(!room.players()[room.current()].bankrupt);
    }
    #[test]
    fn all_bankrupt_ends_game() {
        let mut room = started(Scripted::rolls(&[(1, 2)]));
        room.dispatch(BOB, Action::Bankrupt { target: uuid(2) }).unwrap();
        room.players[0].bankrupt = true; // current player busts too
        room.players[0].has_rolled = true;
        let events = room.dispatch(ALICE, Action::EndTurn).unwrap();
        assert!(room.finished());
        assert!(events.iter().any(|s| matches!(&s.event, Event::Ended { .. })));
    }
    #[test]
    fn bankruptcy_releases_all_holdings() {
        let mut room = started(Scripted::default());
        room.players[0].holdings = set(&["haifa", "rome"]);
        room.board.by_id_mut("haifa").unwrap().owner = Some(uuid(1));
        room.board.by_id_mut("rome").unwrap().owner = Some(uuid(1));
        room.dispatch(ALICE, Action::Bankrupt { target: uuid(1) }).unwrap();
        let player = &room.players()[0];
        assert!(player.bankrupt);
        assert_eq!(player.funds, 0);
        assert!(player.holdings.is_empty());
        assert!(room.board().spaces().iter().all(|s| s.owner.is_none()));
        // turn pointer untouched until the next advance
        assert_eq!(room.current(), 0);
    }
    #[test]
    fn third_party_bankruptcy_rejected() {
        let mut room = started(Scripted::default());
        assert!(matches!(
            room.dispatch(ALICE, Action::Bankrupt { target: uuid(2) }),
            Err(GameError::NotAuthorized(_))
        ));
        assert!(!room.players()[1].bankrupt);
    }
    #[test]
    fn settings_are_leader_gated_and_validated() {
        let mut room = room(Scripted::default());
        let mut config = RoomConfig::default();
        config.starting_funds = 2000;
        assert_eq!(
            room.dispatch(BOB, Action::UpdateSettings { config }).unwrap_err(),
            GameError::NotLeader
        );
        room.dispatch(ALICE, Action::UpdateSettings { config }).unwrap();
        config.max_players = 1;
        assert!(matches!(
            room.dispatch(ALICE, Action::UpdateSettings { config }),
            Err(GameError::InvalidSettings(_))
        ));
    }
    #[test]
    fn kick_is_leader_only_and_pre_start_only() {
        let mut room = room(Scripted::default());
        assert_eq!(
            room.dispatch(BOB, Action::Kick { target: uuid(1) }).unwrap_err(),
            GameError::NotLeader
        );
        let mut room = started(Scripted::default());
        assert_eq!(
            room.dispatch(ALICE, Action::Kick { target: uuid(2) }).unwrap_err(),
            GameError::GameAlreadyStarted
        );
    }
    #[test]
    fn kick_removes_target() {
        let mut room = room(Scripted::default());
        room.dispatch(ALICE, Action::Kick { target: uuid(2) }).unwrap();
        assert_eq!(room.players().len(), 1);
    }
    #[test]
    fn leader_leaving_promotes_next_joined() {
        let mut room = room(Scripted::default());
        let events = room.leave(ALICE);
        assert_eq!(room.players().len(), 1);
        assert!(room.players()[0].is_leader);
        assert!(events
            .iter()
            .any(|s| matches!(&s.event, Event::Message(m) if m.contains("room leader"))));
    }
    #[test]
    fn leave_clamps_turn_pointer() {
        let mut room = started(Scripted::rolls(&[(1, 2)]));
        room.dispatch(ALICE, Action::Roll).unwrap();
        room.dispatch(ALICE, Action::EndTurn).unwrap();
        assert_eq!(room.current(), 1);
        room.leave(BOB);
        assert_eq!(room.current(), 0);
    }
    #[test]
    fn propose_with_insufficient_funds_creates_nothing() {
        let mut room = started(Scripted::default());
        room.players[1].funds = 50;
        let result = room.dispatch(
            BOB,
            Action::ProposeTrade {
                counterparty: uuid(1),
                funds_offered: 100,
                funds_requested: 0,
                spaces_offered: set(&[]),
                spaces_requested: set(&["haifa"]),
            },
        );
        assert!(matches!(result, Err(GameError::InsufficientFunds(_))));
        assert!(room.trades().is_empty());
    }
    #[test]
    fn propose_requires_ownership_of_offered_spaces() {
        let mut room = started(Scripted::default());
        let result = room.dispatch(
            ALICE,
            Action::ProposeTrade {
                counterparty: uuid(2),
                funds_offered: 0,
                funds_requested: 0,
                spaces_offered: set(&["haifa"]),
                spaces_requested: set(&[]),
            },
        );
        assert!(matches!(result, Err(GameError::NotAuthorized(_))));
        assert!(room.trades().is_empty());
    }
    #[test]
    fn accept_is_counterparty_only() {
        let mut room = started(Scripted::default());
        room.dispatch(
            ALICE,
            Action::ProposeTrade {
                counterparty: uuid(2),
                funds_offered: 100,
                funds_requested: 0,
                spaces_offered: set(&[]),
                spaces_requested: set(&[]),
            },
        )
        .unwrap();
        let trade = room.trades()[0].id;
        assert!(matches!(
            room.dispatch(ALICE, Action::AcceptTrade { trade }),
            Err(GameError::NotAuthorized(_))
        ));
    }
    #[test]
    fn accepted_trade_swaps_atomically_and_conserves_funds() {
        let mut room = started(Scripted::default());
        room.players[0].holdings = set(&["haifa"]);
        room.board.by_id_mut("haifa").unwrap().owner = Some(uuid(1));
        room.players[1].holdings = set(&["rome"]);
        room.board.by_id_mut("rome").unwrap().owner = Some(uuid(2));
        room.dispatch(
            ALICE,
            Action::ProposeTrade {
                counterparty: uuid(2),
                funds_offered: 300,
                funds_requested: 100,
                spaces_offered: set(&["haifa"]),
                spaces_requested: set(&["rome"]),
            },
        )
        .unwrap();
        let trade = room.trades()[0].id;
        room.dispatch(BOB, Action::AcceptTrade { trade }).unwrap();
        assert_eq!(room.players()[0].funds, 1500 - 300 + 100);
        assert_eq!(room.players()[1].funds, 1500 + 300 - 100);
        assert_eq!(
            room.players()[0].funds + room.players()[1].funds,
            3000 // room total conserved
        );
        assert!(room.players()[0].holdings.contains("rome"));
        assert!(room.players()[1].holdings.contains("haifa"));
        assert_eq!(room.board().by_id("haifa").unwrap().owner, Some(uuid(2)));
        assert_eq!(room.board().by_id("rome").unwrap().owner, Some(uuid(1)));
        assert!(room.trades().is_empty());
    }
    #[test]
    fn accept_revalidates_funds_at_acceptance_time() {
        let mut room = started(Scripted::default());
        room.dispatch(
            ALICE,
            Action::ProposeTrade {
                counterparty: uuid(2),
                funds_offered: 1000,
                funds_requested: 0,
                spaces_offered: set(&[]),
                spaces_requested: set(&[]),
            },
        )
        .unwrap();
        let trade = room.trades()[0].id;
        room.players[0].funds = 10; // drifted since proposal
        assert!(matches!(
            room.dispatch(BOB, Action::AcceptTrade { trade }),
            Err(GameError::InsufficientFunds(_))
        ));
        assert_eq!(room.players()[1].funds, 1500);
    }
    #[test]
    fn reject_labels_cancel_and_reject() {
        let mut room = started(Scripted::default());
        for _ in 0..2 {
            room.dispatch(
                ALICE,
                Action::ProposeTrade {
                    counterparty: uuid(2),
                    funds_offered: 10,
                    funds_requested: 0,
                    spaces_offered: set(&[]),
                    spaces_requested: set(&[]),
                },
            )
            .unwrap();
        }
        let first = room.trades()[0].id;
        let second = room.trades()[1].id;
        let events = room.dispatch(ALICE, Action::RejectTrade { trade: first }).unwrap();
        assert!(events.iter().any(
            |s| matches!(&s.event, Event::TradeRejected { message, .. } if message.contains("cancelled"))
        ));
        let events = room.dispatch(BOB, Action::RejectTrade { trade: second }).unwrap();
        assert!(events.iter().any(
            |s| matches!(&s.event, Event::TradeRejected { message, .. } if message.contains("rejected"))
        ));
        assert!(room.trades().is_empty());
    }
    #[test]
    fn request_state_is_a_caller_only_snapshot() {
        let mut room = started(Scripted::default());
        let events = room.dispatch(BOB, Action::RequestState).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].audience, Audience::Caller);
        assert!(matches!(events[0].event, Event::State(_)));
    }
    #[test]
    fn errors_leave_state_untouched() {
        let mut room = started(Scripted::default());
        let before = room.snapshot();
        let _ = room.dispatch(BOB, Action::Roll).unwrap_err();
        let _ = room.dispatch(ALICE, Action::EndTurn).unwrap_err();
        let after = room.snapshot();
        assert_eq!(
            serde_json::to_string(&before).unwrap(),
            serde_json::to_string(&after).unwrap()
        );
    }
}
