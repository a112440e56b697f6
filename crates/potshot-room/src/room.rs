//! A single room: its players, its live matches, and the transitions that
//! drive them.
//!
//! Every transition returns the events it wants delivered as
//! `(Recipient, ServerEvent)` pairs. Nothing here touches a channel or a
//! socket, which is what makes the whole game testable without a server.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use potshot_protocol::{
    Action, MatchView, PlayerId, Recipient, RoomCode, RoomView, RoundOutcome,
    ServerEvent,
};
use rand::Rng;

use crate::matchmaker::pair_players;
use crate::resolver::{Termination, resolve_round};
use crate::{GameConfig, MatchState, Player, RoomError};

/// An event addressed to some subset of the room.
pub type Outbound = (Recipient, ServerEvent);

/// Identifies one match within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchId(u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// One 1v1 pairing and its shared pot.
///
/// Stored once per pair. Both participants reach it through the room's
/// seat index, so there is no second copy to keep in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: MatchId,
    pub players: [PlayerId; 2],
    pub pot: i64,
    pub state: MatchState,
}

impl Match {
    /// Returns the other participant, or `None` if `player` isn't in this match.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        match self.players {
            [a, b] if a == player => Some(b),
            [a, b] if b == player => Some(a),
            _ => None,
        }
    }

    fn transition(&mut self, next: MatchState) -> Result<(), RoomError> {
        if !self.state.can_transition_to(next) {
            return Err(RoomError::InvariantViolation(format!(
                "match {} cannot go from {} to {}",
                self.id, self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }
}

/// A room: players in join order plus the matches of the current game.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    config: GameConfig,
    players: Vec<Player>,
    matches: HashMap<MatchId, Match>,
    /// Which match each paired player sits in.
    seats: HashMap<PlayerId, MatchId>,
    next_match_id: u64,
}

impl Room {
    /// Creates an empty room.
    pub fn new(code: RoomCode, config: GameConfig) -> Self {
        Self {
            code,
            config,
            players: Vec::new(),
            matches: HashMap::new(),
            seats: HashMap::new(),
            next_match_id: 1,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Players in the order they joined.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// Number of matches that haven't ended yet.
    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }

    /// The live match `player` sits in, if any.
    pub fn match_for(&self, player: PlayerId) -> Option<&Match> {
        self.seats.get(&player).and_then(|id| self.matches.get(id))
    }

    pub fn view(&self) -> RoomView {
        RoomView {
            id: self.code.clone(),
            players: self.players.iter().map(Player::view).collect(),
        }
    }

    /// `player`'s side of their live match.
    pub fn match_view(&self, player: PlayerId) -> Option<MatchView> {
        let m = self.match_for(player)?;
        let me = self.player(player)?.view();
        let opponent = m
            .opponent_of(player)
            .and_then(|id| self.player(id))
            .map(Player::view);
        Some(MatchView {
            me,
            opponent,
            pot: m.pot,
            ended: m.state.is_ended(),
        })
    }

    // -----------------------------------------------------------------------
    // Joining
    // -----------------------------------------------------------------------

    /// Appends a player with a fresh wallet.
    ///
    /// # Errors
    /// [`RoomError::AlreadyJoined`] if a player with this id is already here.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
    ) -> Result<&Player, RoomError> {
        if self.contains(id) {
            return Err(RoomError::AlreadyJoined(id, self.code.clone()));
        }
        self.players
            .push(Player::new(id, name, self.config.starting_currency));
        let index = self.players.len() - 1;
        Ok(&self.players[index])
    }

    /// Adds a player and announces them.
    ///
    /// The joiner gets `joined room` with the full room; everyone else gets
    /// `player joined`.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
    ) -> Result<Vec<Outbound>, RoomError> {
        let player = self.add_player(id, name)?.view();
        tracing::info!(
            room = %self.code,
            player_id = %id,
            name = %player.name,
            players = self.players.len(),
            "player joined"
        );
        Ok(vec![
            (
                Recipient::Player(id),
                ServerEvent::JoinedRoom {
                    player: player.clone(),
                    room: self.view(),
                },
            ),
            (Recipient::AllExcept(id), ServerEvent::PlayerJoined(player)),
        ])
    }

    // -----------------------------------------------------------------------
    // Matchmaking
    // -----------------------------------------------------------------------

    /// Pairs every player in the room at random, replacing any matches from
    /// a previous game.
    ///
    /// Emits `starting game` to the room, then `match found` or `safe` to
    /// each player in shuffled order, then `game started` with every view.
    pub fn start_game<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Outbound> {
        for player in &mut self.players {
            player.action = None;
        }
        self.matches.clear();
        self.seats.clear();

        let ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        let pairing = pair_players(&ids, rng);

        for &(a, b) in &pairing.pairs {
            let id = MatchId(self.next_match_id);
            self.next_match_id += 1;
            self.matches.insert(
                id,
                Match {
                    id,
                    players: [a, b],
                    pot: self.config.starting_pot,
                    state: MatchState::AwaitingActions,
                },
            );
            self.seats.insert(a, id);
            self.seats.insert(b, id);
        }

        tracing::info!(
            room = %self.code,
            players = ids.len(),
            matches = pairing.pairs.len(),
            safe = ?pairing.safe,
            "game started"
        );

        let mut out = vec![(Recipient::All, ServerEvent::StartingGame)];
        let mut views = BTreeMap::new();
        for &id in &pairing.order {
            let view = match self.match_view(id) {
                Some(view) => {
                    out.push((
                        Recipient::Player(id),
                        ServerEvent::MatchFound(view.clone()),
                    ));
                    view
                }
                None => {
                    out.push((Recipient::Player(id), ServerEvent::Safe));
                    let Some(me) = self.player(id).map(Player::view) else {
                        continue;
                    };
                    MatchView {
                        me,
                        opponent: None,
                        pot: self.config.starting_pot,
                        ended: false,
                    }
                }
            };
            views.insert(id, view);
        }
        out.push((Recipient::All, ServerEvent::GameStarted { matches: views }));
        out
    }

    // -----------------------------------------------------------------------
    // Rounds
    // -----------------------------------------------------------------------

    /// Records `player`'s action for the current round and resolves the
    /// round if their opponent has already acted.
    ///
    /// Submitting again before the opponent acts replaces the earlier
    /// action. Once both have acted the round resolves exactly once: either
    /// the match ends and is removed, or both actions are cleared and each
    /// side gets its refreshed view.
    ///
    /// # Errors
    /// - [`RoomError::MatchNotFound`]: `player` has no live match here.
    /// - [`RoomError::InvariantViolation`]: the outcome table or the seat
    ///   index is inconsistent, or the round would overflow a wallet or the
    ///   pot. The match is left as it was, awaiting actions.
    pub fn submit_action(
        &mut self,
        player: PlayerId,
        action: Action,
    ) -> Result<Vec<Outbound>, RoomError> {
        let match_id = *self
            .seats
            .get(&player)
            .ok_or(RoomError::MatchNotFound(player))?;
        let (seats, pot) = {
            let m = self
                .matches
                .get(&match_id)
                .ok_or(RoomError::MatchNotFound(player))?;
            if m.state != MatchState::AwaitingActions {
                return Err(RoomError::InvariantViolation(format!(
                    "action submitted to match {} in state {}",
                    m.id, m.state
                )));
            }
            (m.players, m.pot)
        };
        let opponent = if seats[0] == player { seats[1] } else { seats[0] };

        self.player_mut(player)
            .ok_or_else(|| missing_player(player))?
            .action = Some(action);
        tracing::debug!(
            room = %self.code,
            player_id = %player,
            %action,
            "action submitted"
        );

        let mut out =
            vec![(Recipient::Player(opponent), ServerEvent::OpponentAction)];

        let mut actions = [action; 2];
        let mut wallets = [0; 2];
        for (seat, &id) in seats.iter().enumerate() {
            let p = self.player(id).ok_or_else(|| missing_player(id))?;
            match p.action {
                Some(a) => actions[seat] = a,
                None => return Ok(out),
            }
            wallets[seat] = p.wallet;
        }

        // Resolve before touching the match so a failure leaves the round
        // open and both pending actions replaceable.
        let resolution =
            resolve_round(actions, wallets, pot, self.config.raise_amount)?;
        let m = self
            .matches
            .get_mut(&match_id)
            .ok_or(RoomError::MatchNotFound(player))?;
        m.transition(MatchState::Resolving)?;
        m.pot = resolution.pot;

        for (seat, &id) in seats.iter().enumerate() {
            let p = self.player_mut(id).ok_or_else(|| missing_player(id))?;
            p.wallet = resolution.wallets[seat];
            p.action = None;
        }

        tracing::debug!(
            room = %self.code,
            match_id = %match_id,
            ?actions,
            pot = resolution.pot,
            wallets = ?resolution.wallets,
            "round resolved"
        );

        match resolution.termination {
            Termination::Continue => {
                if let Some(m) = self.matches.get_mut(&match_id) {
                    m.transition(MatchState::AwaitingActions)?;
                }
                for id in [player, opponent] {
                    let view = self
                        .match_view(id)
                        .ok_or(RoomError::MatchNotFound(id))?;
                    out.push((
                        Recipient::Player(id),
                        ServerEvent::RoundEnded(RoundOutcome::Continued(view)),
                    ));
                }
            }
            Termination::Ended { winner } => {
                let winner = winner.map(|seat| seats[seat]);
                let mut ended = self
                    .matches
                    .remove(&match_id)
                    .ok_or(RoomError::MatchNotFound(player))?;
                ended.transition(MatchState::Ended)?;
                self.seats.remove(&seats[0]);
                self.seats.remove(&seats[1]);

                tracing::info!(
                    room = %self.code,
                    match_id = %ended.id,
                    state = %ended.state,
                    pot = ended.pot,
                    winner = ?winner,
                    "match ended"
                );

                let winner_view =
                    winner.and_then(|id| self.player(id)).map(Player::view);
                let outcome = RoundOutcome::ended(winner_view);
                out.push((
                    Recipient::Player(player),
                    ServerEvent::RoundEnded(outcome.clone()),
                ));
                out.push((
                    Recipient::Player(opponent),
                    ServerEvent::RoundEnded(outcome),
                ));
            }
        }

        Ok(out)
    }
}

fn missing_player(id: PlayerId) -> RoomError {
    RoomError::InvariantViolation(format!(
        "player {id} is seated in a match but not in the room"
    ))
}
