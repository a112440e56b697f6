//! The round outcome table.
//!
//! Given both sides' actions, their wallets, and the pot, decide how money
//! moves and whether the match is over. Pure: the caller applies the result.

use potshot_protocol::Action;

use crate::RoomError;

/// What happens to the match after a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Clear actions and play another round.
    Continue,
    /// The match is over. `winner` is a seat index (0 or 1), `None` on a draw.
    Ended { winner: Option<usize> },
}

/// The state of a match after a round has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub pot: i64,
    /// Post-round wallets, in the same seat order as the input.
    pub wallets: [i64; 2],
    pub termination: Termination,
}

/// Resolves one round. Seats are positional: `actions[i]` and `wallets[i]`
/// belong to the same player.
///
/// | pair           | money                          | ends when            |
/// |----------------|--------------------------------|----------------------|
/// | raise + raise  | pot += 2×raise, each pays raise | someone is depleted  |
/// | steal + steal  | pot burned                     | someone is depleted  |
/// | shoot + shoot  | pot burned                     | always, draw         |
/// | raise + steal  | stealer takes pot              | someone is depleted  |
/// | raise + shoot  | raiser takes pot               | always, raiser wins  |
/// | steal + shoot  | shooter takes pot              | someone is depleted  |
///
/// "Depleted" means a post-round wallet below `raise_amount`; see
/// [`depletion`] for who wins.
///
/// # Errors
/// [`RoomError::InvariantViolation`] if the pot or a wallet would overflow
/// `i64`. Nothing is applied in that case.
pub fn resolve_round(
    actions: [Action; 2],
    wallets: [i64; 2],
    pot: i64,
    raise_amount: i64,
) -> Result<Resolution, RoomError> {
    // Sort the seats by action so the table only lists each pair once.
    let (lo, hi) = if actions[0] <= actions[1] { (0, 1) } else { (1, 0) };

    let mut wallets = wallets;
    let mut pot = pot;

    let termination = match (actions[lo], actions[hi]) {
        (Action::Raise, Action::Raise) => {
            pot = raise_amount
                .checked_mul(2)
                .and_then(|stake| pot.checked_add(stake))
                .ok_or_else(|| overflow("pot", pot))?;
            for wallet in &mut wallets {
                let before = *wallet;
                *wallet = before
                    .checked_sub(raise_amount)
                    .ok_or_else(|| overflow("wallet", before))?;
            }
            depletion(wallets, raise_amount)
        }
        (Action::Steal, Action::Steal) => {
            pot = 0;
            depletion(wallets, raise_amount)
        }
        (Action::Shoot, Action::Shoot) => {
            pot = 0;
            Termination::Ended { winner: None }
        }
        (Action::Raise, Action::Steal) => {
            wallets[hi] = collect(wallets[hi], pot)?;
            pot = 0;
            depletion(wallets, raise_amount)
        }
        (Action::Raise, Action::Shoot) => {
            wallets[lo] = collect(wallets[lo], pot)?;
            pot = 0;
            Termination::Ended { winner: Some(lo) }
        }
        (Action::Steal, Action::Shoot) => {
            wallets[hi] = collect(wallets[hi], pot)?;
            pot = 0;
            depletion(wallets, raise_amount)
        }
        (first, second) => {
            return Err(RoomError::InvariantViolation(format!(
                "no outcome for {first} + {second}"
            )));
        }
    };

    Ok(Resolution {
        pot,
        wallets,
        termination,
    })
}

/// Moves the pot into a wallet.
fn collect(wallet: i64, pot: i64) -> Result<i64, RoomError> {
    wallet
        .checked_add(pot)
        .ok_or_else(|| overflow("wallet", wallet))
}

fn overflow(what: &str, value: i64) -> RoomError {
    RoomError::InvariantViolation(format!("{what} overflowed from {value}"))
}

/// Ends the match if either wallet can no longer cover a raise.
///
/// The winner is whoever can still raise. If both are depleted in the same
/// round the match is a draw, so the result doesn't depend on which side
/// happened to submit last. Crediting the seat that was processed first
/// would make the winner an accident of arrival order.
pub fn depletion(wallets: [i64; 2], raise_amount: i64) -> Termination {
    match (wallets[0] < raise_amount, wallets[1] < raise_amount) {
        (false, false) => Termination::Continue,
        (true, false) => Termination::Ended { winner: Some(1) },
        (false, true) => Termination::Ended { winner: Some(0) },
        (true, true) => Termination::Ended { winner: None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Action::*;

    const RAISE: i64 = 10;

    fn resolve(actions: [Action; 2], wallets: [i64; 2], pot: i64) -> Resolution {
        resolve_round(actions, wallets, pot, RAISE).unwrap()
    }

    #[test]
    fn test_raise_raise_grows_pot_and_charges_both() {
        let r = resolve([Raise, Raise], [100, 100], 10);
        assert_eq!(r.pot, 30);
        assert_eq!(r.wallets, [90, 90]);
        assert_eq!(r.termination, Termination::Continue);
    }

    #[test]
    fn test_raise_raise_ends_when_one_side_is_depleted() {
        // The 5-wallet side can't cover the raise; it is still charged.
        let r = resolve([Raise, Raise], [5, 100], 10);
        assert_eq!(r.wallets, [-5, 90]);
        assert_eq!(r.pot, 30);
        assert_eq!(r.termination, Termination::Ended { winner: Some(1) });
    }

    #[test]
    fn test_raise_raise_both_depleted_is_a_draw() {
        let r = resolve([Raise, Raise], [15, 12], 10);
        assert_eq!(r.wallets, [5, 2]);
        assert_eq!(r.termination, Termination::Ended { winner: None });
    }

    #[test]
    fn test_steal_steal_burns_pot() {
        let r = resolve([Steal, Steal], [50, 60], 40);
        assert_eq!(r.pot, 0);
        assert_eq!(r.wallets, [50, 60]);
        assert_eq!(r.termination, Termination::Continue);
    }

    #[test]
    fn test_steal_steal_ends_if_already_depleted() {
        let r = resolve([Steal, Steal], [50, 3], 40);
        assert_eq!(r.termination, Termination::Ended { winner: Some(0) });
    }

    #[test]
    fn test_shoot_shoot_is_always_a_draw() {
        for wallets in [[100, 100], [0, 0], [5, 500]] {
            let r = resolve([Shoot, Shoot], wallets, 70);
            assert_eq!(r.pot, 0);
            assert_eq!(r.wallets, wallets);
            assert_eq!(r.termination, Termination::Ended { winner: None });
        }
    }

    #[test]
    fn test_raise_steal_pays_the_stealer_either_seat() {
        let r = resolve([Raise, Steal], [80, 80], 30);
        assert_eq!(r.wallets, [80, 110]);
        assert_eq!(r.pot, 0);
        assert_eq!(r.termination, Termination::Continue);

        let r = resolve([Steal, Raise], [80, 80], 30);
        assert_eq!(r.wallets, [110, 80]);
    }

    #[test]
    fn test_raise_steal_does_not_charge_the_raiser() {
        // Only raise + raise moves money into the pot.
        let r = resolve([Raise, Steal], [10, 10], 0);
        assert_eq!(r.wallets, [10, 10]);
        assert_eq!(r.termination, Termination::Continue);
    }

    #[test]
    fn test_raise_shoot_always_ends_with_raiser_winning() {
        let r = resolve([Shoot, Raise], [100, 100], 25);
        assert_eq!(r.wallets, [100, 125]);
        assert_eq!(r.pot, 0);
        assert_eq!(r.termination, Termination::Ended { winner: Some(1) });

        let r = resolve([Raise, Shoot], [1, 100], 25);
        assert_eq!(r.wallets, [26, 100]);
        assert_eq!(r.termination, Termination::Ended { winner: Some(0) });
    }

    #[test]
    fn test_steal_shoot_pays_the_shooter() {
        let r = resolve([Steal, Shoot], [40, 40], 20);
        assert_eq!(r.wallets, [40, 60]);
        assert_eq!(r.pot, 0);
        assert_eq!(r.termination, Termination::Continue);
    }

    #[test]
    fn test_steal_shoot_ends_when_stealer_is_depleted() {
        let r = resolve([Shoot, Steal], [40, 9], 20);
        assert_eq!(r.wallets, [60, 9]);
        assert_eq!(r.termination, Termination::Ended { winner: Some(0) });
    }

    #[test]
    fn test_outcome_is_symmetric_under_seat_swap() {
        for a in Action::ALL {
            for b in Action::ALL {
                let r = resolve([a, b], [70, 20], 15);
                let s = resolve([b, a], [20, 70], 15);
                assert_eq!(r.pot, s.pot, "{a} + {b}");
                assert_eq!(r.wallets, [s.wallets[1], s.wallets[0]], "{a} + {b}");
                let swapped = match s.termination {
                    Termination::Ended { winner } => Termination::Ended {
                        winner: winner.map(|seat| 1 - seat),
                    },
                    Termination::Continue => Termination::Continue,
                };
                assert_eq!(r.termination, swapped, "{a} + {b}");
            }
        }
    }

    #[test]
    fn test_raise_raise_overflow_is_an_error_not_a_panic() {
        let raise = i64::MAX / 2 + 1;
        let result = resolve_round([Raise, Raise], [i64::MAX, i64::MAX], 0, raise);
        assert!(matches!(result, Err(RoomError::InvariantViolation(_))));
    }

    #[test]
    fn test_wallet_below_min_after_raise_is_an_error() {
        let result = resolve_round([Raise, Raise], [i64::MIN, 100], 0, RAISE);
        assert!(matches!(result, Err(RoomError::InvariantViolation(_))));
    }

    #[test]
    fn test_pot_credit_overflow_is_an_error() {
        for actions in [[Raise, Steal], [Raise, Shoot], [Steal, Shoot]] {
            let result = resolve_round(actions, [i64::MAX, i64::MAX], 1, RAISE);
            assert!(
                matches!(result, Err(RoomError::InvariantViolation(_))),
                "{actions:?}"
            );
        }
    }

    #[test]
    fn test_depletion_boundary_is_strictly_below() {
        assert_eq!(depletion([10, 10], 10), Termination::Continue);
        assert_eq!(depletion([9, 10], 10), Termination::Ended { winner: Some(1) });
    }
}
