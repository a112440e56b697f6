//! Random pairing of a room's players into 1v1 matches.

use potshot_protocol::PlayerId;
use rand::Rng;
use rand::seq::SliceRandom;

/// The result of one matchmaking pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    /// Every player in the shuffled order the pairs were cut from.
    pub order: Vec<PlayerId>,
    /// Consecutive players from `order`: positions (0, 1), (2, 3), and so on.
    pub pairs: Vec<(PlayerId, PlayerId)>,
    /// The odd player out, if the room has an odd number of players.
    pub safe: Option<PlayerId>,
}

/// Shuffles `players` and pairs them off two at a time.
///
/// The shuffle is `SliceRandom::shuffle` (Fisher–Yates), so every ordering
/// is equally likely. Pairs are recorded as they are cut, which keeps the
/// two sides of a match pointing at each other by construction.
pub fn pair_players<R: Rng + ?Sized>(
    players: &[PlayerId],
    rng: &mut R,
) -> Pairing {
    let mut order = players.to_vec();
    order.shuffle(rng);

    let mut chunks = order.chunks_exact(2);
    let pairs = chunks.by_ref().map(|pair| (pair[0], pair[1])).collect();
    let safe = chunks.remainder().first().copied();

    Pairing { order, pairs, safe }
}
