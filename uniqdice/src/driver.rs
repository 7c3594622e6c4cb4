use crate::{
    dice::InitStrategy,
    game::{GameRunner, Trial},
};
use log::debug;
use rand::{rngs::OsRng, Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::{fmt, str::FromStr};

//////////
// Seed //
//////////

/// Where the driver's random number generator gets its seed from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Seed {
    /// Draw a fresh seed from the operating system.
    #[default]
    Entropy,
    Fixed(u64),
}

impl Seed {
    /// Pin down the concrete seed value, so an entropy-seeded run can still be
    /// reproduced later.
    pub fn resolve(self) -> u64 {
        match self {
            Self::Entropy => OsRng.next_u64(),
            Self::Fixed(seed) => seed,
        }
    }
}

impl FromStr for Seed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seed = match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };
        seed.map(Self::Fixed)
            .map_err(|err| format!("seed is not a valid u64: {err}"))
    }
}

/// The generator every game draws from. Fast, and plenty good for Monte Carlo.
pub fn seeded_rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

///////////
// Tally //
///////////

/// Aggregate outcomes over many games.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub won: u64,
    pub lost: u64,
    /// Sum of `n_rolls` over every game.
    pub total_rolls: u64,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, trial: Trial) {
        if trial.won {
            self.won += 1;
        } else {
            self.lost += 1;
        }
        self.total_rolls += trial.n_rolls as u64;
    }

    #[inline]
    pub fn games(&self) -> u64 {
        self.won + self.lost
    }

    pub fn win_rate(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => self.won as f64 / games as f64,
        }
    }

    pub fn mean_rolls(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => self.total_rolls as f64 / games as f64,
        }
    }
}

/// The plain-text run summary:
///
/// ```text
/// win/loss ratio:
/// <won>/<lost>
///
///
///  total = <won + lost>
/// ```
impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "win/loss ratio:")?;
        writeln!(f, "{}/{}", self.won, self.lost)?;
        write!(f, "\n\n total = {}", self.games())
    }
}

////////////
// Driver //
////////////

/// Play `n_games` independent games, one after another, and tally the results.
pub fn run_games<R: Rng>(n_games: u64, rng: R, init: InitStrategy) -> Tally {
    debug!("run_games: n_games: {n_games}, init: {init}");

    let mut runner = GameRunner::new(rng, init);
    let mut tally = Tally::new();

    for _ in 0..n_games {
        tally.record(runner.play());
    }

    debug!(
        "run_games: won: {}, lost: {}, total rolls: {}",
        tally.won, tally.lost, tally.total_rolls
    );

    tally
}

#[cfg(test)]
mod test {
    use super::*;
    use claim::{assert_err, assert_ge, assert_le, assert_lt};

    // Exact Pr[win] for a full game, from solving the absorbing Markov chain
    // over all 35 dice states.
    const P_WIN_INDEPENDENT: f64 = 0.962171052631578;
    const P_WIN_STARS_AND_BARS: f64 = 0.957473684210525;

    #[test]
    fn test_tally_display() {
        let tally = Tally {
            won: 3,
            lost: 1,
            total_rolls: 9,
        };
        assert_eq!("win/loss ratio:\n3/1\n\n\n total = 4", tally.to_string());
        assert_eq!(
            "win/loss ratio:\n0/0\n\n\n total = 0",
            Tally::new().to_string()
        );
    }

    #[test]
    fn test_tally_record() {
        let mut tally = Tally::new();
        assert_eq!(0.0, tally.win_rate());
        assert_eq!(0.0, tally.mean_rolls());

        tally.record(Trial { won: true, n_rolls: 1 });
        tally.record(Trial { won: true, n_rolls: 2 });
        tally.record(Trial { won: false, n_rolls: 3 });
        tally.record(Trial { won: true, n_rolls: 6 });

        assert_eq!(3, tally.won);
        assert_eq!(1, tally.lost);
        assert_eq!(4, tally.games());
        assert_eq!(0.75, tally.win_rate());
        assert_eq!(3.0, tally.mean_rolls());
    }

    #[test]
    fn test_seed_from_str() {
        assert_eq!(Seed::Fixed(42), Seed::from_str("42").unwrap());
        assert_eq!(Seed::Fixed(0xd15c0), Seed::from_str("0xd15c0").unwrap());
        assert_err!(Seed::from_str(""));
        assert_err!(Seed::from_str("-1"));
        assert_err!(Seed::from_str("0xnope"));
    }

    #[test]
    fn test_seed_resolve() {
        assert_eq!(7, Seed::Fixed(7).resolve());
        // can't say much about entropy, except that it's very unlikely to
        // repeat
        assert_ne!(Seed::Entropy.resolve(), Seed::Entropy.resolve());
    }

    #[test]
    fn test_run_games_is_reproducible() {
        for init in InitStrategy::all() {
            let tally1 = run_games(10_000, seeded_rng(0xd15c0), init);
            let tally2 = run_games(10_000, seeded_rng(0xd15c0), init);

            assert_eq!(tally1, tally2);
            assert_eq!(10_000, tally1.games());
            assert_ge!(tally1.total_rolls, tally1.games());
        }
    }

    // Pins the exact sequence of draws. Reordering how the dice are sampled
    // changes these numbers even when the statistics stay the same.
    #[test]
    fn test_run_games_golden_tally() {
        assert_eq!(
            Tally {
                won: 9_600,
                lost: 400,
                total_rolls: 75_787,
            },
            run_games(10_000, seeded_rng(0xd15c0), InitStrategy::Independent),
        );
        assert_eq!(
            Tally {
                won: 9_545,
                lost: 455,
                total_rolls: 80_960,
            },
            run_games(10_000, seeded_rng(0xd15c0), InitStrategy::StarsAndBars),
        );
    }

    #[test]
    fn test_run_games_zero() {
        assert_eq!(Tally::new(), run_games(0, seeded_rng(1), InitStrategy::Independent));
    }

    fn assert_win_rate_near(init: InitStrategy, p_win: f64) {
        let n = 200_000;
        let tally = run_games(n, seeded_rng(0x5eed), init);

        // the win rate is a binomial proportion; it should land well within a
        // few standard errors of the true probability.
        let stderr = (p_win * (1.0 - p_win) / n as f64).sqrt();
        assert_le!((tally.win_rate() - p_win).abs(), 5.0 * stderr);
    }

    #[test]
    fn test_run_games_win_rate() {
        assert_win_rate_near(InitStrategy::Independent, P_WIN_INDEPENDENT);
        assert_win_rate_near(InitStrategy::StarsAndBars, P_WIN_STARS_AND_BARS);

        // the two strategies are far enough apart to tell which one we ran
        assert_lt!(
            10.0 * (P_WIN_INDEPENDENT * (1.0 - P_WIN_INDEPENDENT) / 200_000.0).sqrt(),
            P_WIN_INDEPENDENT - P_WIN_STARS_AND_BARS,
        );
    }
}
