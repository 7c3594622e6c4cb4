use crate::dice::{DiceState, GameResult, InitStrategy};
use log::trace;
use rand::{distributions::Distribution, Rng};

/// The outcome of one full game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Trial {
    pub won: bool,
    /// The number of rolls made, including the final one. Always `>= 1`.
    pub n_rolls: u32,
}

/// Plays games of reroll-the-duplicates, drawing all randomness from `rng`.
pub struct GameRunner<R> {
    rng: R,
    init: InitStrategy,
}

impl<R: Rng> GameRunner<R> {
    pub fn new(rng: R, init: InitStrategy) -> Self {
        Self { rng, init }
    }

    /// Deal a fresh set of dice and play until the game is won or lost.
    pub fn play(&mut self) -> Trial {
        let state = self.init.sample(&mut self.rng);
        self.play_from(state)
    }

    /// Play a game where the dice were dealt as `state`. The first roll happens
    /// immediately, so even a winning `state` takes one roll.
    pub fn play_from(&mut self, mut state: DiceState) -> Trial {
        let mut n_rolls = 1;

        loop {
            state = state.roll(&mut self.rng);

            let result = state.game_result();
            if result.is_over() {
                return self.finish(result, n_rolls, state);
            }
            n_rolls += 1;
        }
    }

    #[inline]
    fn finish(&self, result: GameResult, n_rolls: u32, state: DiceState) -> Trial {
        let won = result == GameResult::Won;
        trace!("game over: won: {won}, n_rolls: {n_rolls}, final dice: {state}");
        Trial { won, n_rolls }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use claim::{assert_ge, assert_le};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn runner(seed: u64, init: InitStrategy) -> GameRunner<Xoshiro256PlusPlus> {
        GameRunner::new(Xoshiro256PlusPlus::seed_from_u64(seed), init)
    }

    #[test]
    fn test_play_from_all_unique_wins_in_one_roll() {
        let mut runner = runner(0xd15c0, InitStrategy::Independent);
        let state = DiceState::new([1, 1, 1, 1]).unwrap();

        for _ in 0..100 {
            assert_eq!(Trial { won: true, n_rolls: 1 }, runner.play_from(state));
        }
    }

    #[test]
    fn test_play_from_all_same_rerolls_everything() {
        let mut runner = runner(0xd15c0, InitStrategy::Independent);
        let state = DiceState::new([0, 0, 4, 0]).unwrap();

        // starting from a "lost" board still rolls, so we should see some wins
        let trials = (0..1_000)
            .map(|_| runner.play_from(state))
            .collect::<Vec<_>>();

        assert!(trials.iter().any(|trial| trial.won));
        assert!(trials.iter().all(|trial| trial.n_rolls >= 1));
    }

    #[test]
    fn test_play_from_stops_on_first_terminal_roll() {
        let state = DiceState::new([2, 1, 0, 1]).unwrap();

        // replay each game's rolls by hand with an identically seeded rng
        let mut runner = runner(0xf00d, InitStrategy::Independent);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0xf00d);

        for _ in 0..1_000 {
            let trial = runner.play_from(state);

            let mut replay = state;
            for _ in 0..trial.n_rolls - 1 {
                replay = replay.roll(&mut rng);
                assert_eq!(GameResult::NotOver, replay.game_result());
            }
            replay = replay.roll(&mut rng);

            let expected = if trial.won { GameResult::Won } else { GameResult::Lost };
            assert_eq!(expected, replay.game_result());
        }
    }

    #[test]
    fn test_play_terminates() {
        for init in InitStrategy::all() {
            let mut runner = runner(0x5eed, init);
            for _ in 0..10_000 {
                let trial = runner.play();
                assert_ge!(trial.n_rolls, 1);
                // sanity ceiling, not a rule of the game
                assert_le!(trial.n_rolls, 10_000);
            }
        }
    }

    #[test]
    fn test_play_is_reproducible() {
        let mut runner1 = runner(42, InitStrategy::Independent);
        let mut runner2 = runner(42, InitStrategy::Independent);

        for _ in 0..1_000 {
            assert_eq!(runner1.play(), runner2.play());
        }
    }
}
