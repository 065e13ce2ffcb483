//! Session/broadcast coordinator
//!
//! Tracks connected players, serializes answer submissions against the
//! round and fans every round event out to all players. The round lock is
//! held for the whole validate-fold-advance sequence, so concurrent
//! answers are applied one at a time in arrival order and credit is
//! decided deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::net::messages::ServerMessage;
use crate::provider::TrackProvider;
use crate::round::Round;

/// Buffered events per subscriber before a slow client starts lagging
const EVENT_CAPACITY: usize = 100;

/// A connected player; lives exactly as long as its connection
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u64,
    /// Display name, taken from the player's latest answer
    pub pseudo: String,
}

pub struct Session {
    round: Mutex<Round>,
    events: broadcast::Sender<ServerMessage>,
    players: Mutex<HashMap<u64, Player>>,
    next_player_id: AtomicU64,
}

impl Session {
    pub fn new(provider: Arc<dyn TrackProvider>, settle_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            round: Mutex::new(Round::new(provider, settle_delay)),
            events,
            players: Mutex::new(HashMap::new()),
            next_player_id: AtomicU64::new(1),
        }
    }

    /// Subscribe to the round event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.events.subscribe()
    }

    /// Register a new player and return its connection id.
    pub async fn connect(&self) -> u64 {
        let id = self.next_player_id.fetch_add(1, Ordering::SeqCst);
        let mut players = self.players.lock().await;
        players.insert(
            id,
            Player {
                id,
                pseudo: String::new(),
            },
        );
        info!("🔌 Player {} connected ({} online)", id, players.len());
        id
    }

    pub async fn disconnect(&self, id: u64) {
        let mut players = self.players.lock().await;
        players.remove(&id);
        info!("🔌 Player {} disconnected ({} online)", id, players.len());
    }

    pub async fn player_count(&self) -> usize {
        self.players.lock().await.len()
    }

    /// Apply one guess to the round and broadcast the verdict to everyone.
    ///
    /// Empty and whitespace-only guesses are a silent no-op. When the guess
    /// completes the round, the finished track's answer is announced before
    /// the skip, then the new round starts.
    pub async fn submit_answer(&self, player_id: u64, answer: &str, pseudo: &str) {
        if answer.trim().is_empty() {
            debug!("Ignoring empty guess from {:?}", pseudo);
            return;
        }

        {
            let mut players = self.players.lock().await;
            if let Some(player) = players.get_mut(&player_id) {
                player.pseudo = pseudo.to_string();
            }
        }

        let mut round = self.round.lock().await;
        let outcome = match round.on_answer(answer) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.broadcast(ServerMessage::Error {
                    message: e.to_string(),
                });
                return;
            }
        };

        info!(
            "📝 {} guessed {:?} (title: {}, artist: {})",
            pseudo, answer, outcome.result.title_match, outcome.result.artist_match
        );

        self.broadcast(ServerMessage::Reply {
            answer: answer.to_string(),
            pseudo: pseudo.to_string(),
            title_found: outcome.result.title_match,
            artist_found: outcome.result.artist_match,
            confidence: outcome.result.confidence,
            title: outcome.title,
            artists: outcome.artists,
        });

        if outcome.round_complete {
            self.advance_locked(&mut round, true).await;
        }
    }

    /// Move to the next track. `should_skip = false` re-fetches the
    /// provider's current track without skipping, to resynchronize after
    /// an external manual skip.
    pub async fn request_next_track(&self, should_skip: bool) {
        let mut round = self.round.lock().await;
        self.advance_locked(&mut round, should_skip).await;
    }

    /// Broadcast a masked reveal of the current track.
    pub async fn send_hint(&self) {
        let round = self.round.lock().await;
        match round.hint() {
            Ok(hint) => self.broadcast(ServerMessage::Hint {
                title: hint.title,
                artists: hint.artists,
            }),
            Err(e) => self.broadcast(ServerMessage::Error {
                message: e.to_string(),
            }),
        }
    }

    /// Advance while already holding the round lock. Announces the
    /// finished track first when skipping, so players always see the full
    /// answer of the track they just played.
    async fn advance_locked(&self, round: &mut Round, skip: bool) {
        if skip {
            if let Some(message) = round.reveal() {
                self.broadcast(ServerMessage::RightAnswer { message });
            }
        }

        match round.advance(skip).await {
            Ok(()) => self.broadcast(ServerMessage::NewTrack),
            Err(e) => {
                warn!("Failed to advance round: {}", e);
                self.broadcast(ServerMessage::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        // Lossy on purpose: no subscribers just means nobody is listening yet
        let _ = self.events.send(message);
    }
}
