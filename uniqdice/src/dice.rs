use crate::{num_multisets, num_orderings, NUM_DICE, NUM_FACES};
use claim::debug_assert_le;
use itertools::Itertools;
#[cfg(test)]
use proptest::{
    arbitrary::Arbitrary,
    strategy::{BoxedStrategy, Strategy},
};
use rand::{distributions::Distribution, Rng};
use std::{fmt, str::FromStr};

const FACES: usize = NUM_FACES as usize;

/// The number of split points needed to cut `NUM_DICE` dice into `NUM_FACES`
/// bins.
const NUM_SPLIT_POINTS: usize = FACES - 1;

/// A single fair die roll, uniform over the faces `0 <= face < NUM_FACES`.
#[derive(Copy, Clone, Debug)]
pub struct FaceDistr;

impl Distribution<u8> for FaceDistr {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        rng.gen_range(0..NUM_FACES)
    }
}

////////////////
// GameResult //
////////////////

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GameResult {
    /// All the dice show the same face.
    Lost,
    /// Still some duplicates to reroll.
    NotOver,
    /// Every die shows a unique face.
    Won,
}

impl GameResult {
    #[inline]
    pub fn is_over(self) -> bool {
        !matches!(self, Self::NotOver)
    }
}

///////////////
// DiceState //
///////////////

/// The dice currently on the table, as a histogram over die faces:
/// `DiceState([c_0, c_1, c_2, c_3])` means `c_i` dice show face `i`.
///
/// The dice themselves are indistinguishable, so this is all the game ever needs
/// to know. The counts always sum to `NUM_DICE`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiceState([u8; FACES]);

impl DiceState {
    pub fn new(counts: [u8; FACES]) -> Result<Self, String> {
        let sum: u32 = counts.iter().map(|&count| count as u32).sum();
        if sum != NUM_DICE as u32 {
            return Err(format!(
                "dice counts must sum to {NUM_DICE}, but {counts:?} sums to {sum}"
            ));
        }
        Ok(Self(counts))
    }

    /// Tally a list of rolled faces into a `DiceState`.
    pub fn from_faces(faces: [u8; NUM_DICE as usize]) -> Result<Self, String> {
        let mut counts = [0_u8; FACES];
        for face in faces {
            if face >= NUM_FACES {
                return Err(format!("face is out of range [0, {NUM_FACES}): {face}"));
            }
            counts[face as usize] += 1;
        }
        Ok(Self(counts))
    }

    /// Build a state from sorted "stars and bars" split points
    /// `0 <= s_0 <= s_1 <= s_2 <= NUM_DICE`.
    fn from_split_points(split_points: [u8; NUM_SPLIT_POINTS]) -> Self {
        let [s0, s1, s2] = split_points;
        debug_assert_le!(s0, s1);
        debug_assert_le!(s1, s2);
        debug_assert_le!(s2, NUM_DICE);

        Self([s0, s1 - s0, s2 - s1, NUM_DICE - s2])
    }

    /// Inverse of [`DiceState::from_split_points`]: the running totals of the
    /// first three bins.
    fn split_points(&self) -> [u8; NUM_SPLIT_POINTS] {
        let [c0, c1, c2, _] = self.0;
        [c0, c0 + c1, c0 + c1 + c2]
    }

    /// All valid dice states, in ascending split point order. There are
    /// `NUM_FACES multichoose NUM_DICE` of them.
    pub fn all() -> Vec<Self> {
        let mut out =
            Vec::with_capacity(num_multisets(NUM_FACES as u32, NUM_DICE as u32) as usize);

        // every sorted triple of split points in [0, NUM_DICE] is one state
        for split_points in (0..=NUM_DICE).combinations_with_replacement(NUM_SPLIT_POINTS) {
            let split_points = [split_points[0], split_points[1], split_points[2]];
            out.push(Self::from_split_points(split_points));
        }

        out
    }

    #[inline]
    pub fn counts(&self) -> [u8; FACES] {
        self.0
    }

    #[inline]
    pub fn count(&self, face: u8) -> u8 {
        self.0[face as usize]
    }

    #[inline]
    pub fn sum(&self) -> u8 {
        self.0.iter().sum()
    }

    #[inline]
    pub(crate) fn invariant(&self) -> bool {
        self.sum() == NUM_DICE
    }

    /// Roll `NUM_DICE` independent fair dice and tally them up.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut counts = [0_u8; FACES];
        for _ in 0..NUM_DICE {
            counts[FaceDistr.sample(rng) as usize] += 1;
        }

        let state = Self(counts);
        debug_assert!(state.invariant());
        state
    }

    /// Pick `NUM_SPLIT_POINTS` uniform split points in `[0, NUM_DICE]`, sort
    /// them, and cut the dice into bins at those points.
    ///
    /// Note: this is _not_ distributed like [`DiceState::random`]. Each state is
    /// weighted by the number of orderings of its split points, out of
    /// `(NUM_DICE + 1)^NUM_SPLIT_POINTS`, rather than the number of orderings of
    /// its dice. For example, all four dice land on face 0 with probability
    /// `1/125` here but `1/256` with real dice.
    pub fn random_stars_and_bars<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut split_points = [0_u8; NUM_SPLIT_POINTS];
        for split_point in split_points.iter_mut() {
            *split_point = rng.gen_range(0..=NUM_DICE);
        }
        split_points.sort_unstable();

        Self::from_split_points(split_points)
    }

    /// Reroll every die in a duplicate group (any face with count > 1). Dice
    /// showing a unique face stay where they are.
    ///
    /// Rerolled dice can land anywhere, including on a unique die's face.
    #[must_use]
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let mut next = [0_u8; FACES];

        for (face, &count) in self.0.iter().enumerate() {
            match count {
                0 => {}
                1 => next[face] += 1,
                n => {
                    for _ in 0..n {
                        next[FaceDistr.sample(rng) as usize] += 1;
                    }
                }
            }
        }

        let next = Self(next);
        debug_assert!(next.invariant(), "roll: {self} -> {next}");
        next
    }

    /// Whether the game is won, lost, or still going. Assumes the state is
    /// valid (counts sum to `NUM_DICE`).
    pub fn game_result(&self) -> GameResult {
        let mut all_unique = true;

        for &count in &self.0 {
            if count == NUM_DICE {
                return GameResult::Lost;
            }
            all_unique &= count == 1;
        }

        if all_unique {
            GameResult::Won
        } else {
            GameResult::NotOver
        }
    }

    /// `Pr[DiceState::random(rng) = self]`
    pub fn p_random(&self) -> f64 {
        let total = (NUM_FACES as f64).powi(NUM_DICE as i32);
        num_orderings(&self.0) as f64 / total
    }

    /// `Pr[DiceState::random_stars_and_bars(rng) = self]`
    pub fn p_random_stars_and_bars(&self) -> f64 {
        // multiplicity of each split point value
        let mut split_counts = [0_u8; NUM_DICE as usize + 1];
        for split_point in self.split_points() {
            split_counts[split_point as usize] += 1;
        }

        let total = (NUM_DICE as f64 + 1.0).powi(NUM_SPLIT_POINTS as i32);
        num_orderings(&split_counts) as f64 / total
    }
}

impl fmt::Debug for DiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for DiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [c0, c1, c2, c3] = self.0;
        write!(f, "[{c0}, {c1}, {c2}, {c3}]")
    }
}

/// Parse a comma/space/tab separated list of face counts into a `DiceState`.
/// Enclosing brackets ('[' or ']') optional.
impl FromStr for DiceState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('[').trim_end_matches(']');

        let splitters = &[',', ' ', '\n', '\t'];
        let mut counts = [0_u8; FACES];
        let mut len = 0;

        for count_str in s.split(splitters).filter(|s| !s.is_empty()) {
            if len >= FACES {
                return Err(format!("too many face counts, expected {FACES}"));
            }
            counts[len] = count_str
                .parse::<u8>()
                .map_err(|err| format!("face count is not a valid integer: {err}"))?;
            len += 1;
        }

        if len != FACES {
            return Err(format!("expected {FACES} face counts, got {len}"));
        }

        Self::new(counts)
    }
}

//////////////////
// InitStrategy //
//////////////////

/// How the dice are thrown at the start of each game.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InitStrategy {
    /// Roll every die independently. See [`DiceState::random`].
    #[default]
    Independent,
    /// Cut the dice at uniform random split points. Reproduces the statistics
    /// of older versions of this tool. See [`DiceState::random_stars_and_bars`].
    StarsAndBars,
}

impl InitStrategy {
    pub const fn all() -> [Self; 2] {
        [Self::Independent, Self::StarsAndBars]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::StarsAndBars => "stars-and-bars",
        }
    }

    /// The probability that this strategy deals `state`.
    pub fn pmf(self, state: &DiceState) -> f64 {
        match self {
            Self::Independent => state.p_random(),
            Self::StarsAndBars => state.p_random_stars_and_bars(),
        }
    }
}

impl Distribution<DiceState> for InitStrategy {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceState {
        match self {
            Self::Independent => DiceState::random(rng),
            Self::StarsAndBars => DiceState::random_stars_and_bars(rng),
        }
    }
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| {
                format!("unknown init strategy '{s}', expected 'independent' or 'stars-and-bars'")
            })
    }
}

cfg_test! {
    impl Arbitrary for DiceState {
        type Parameters = ();
        type Strategy = BoxedStrategy<DiceState>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            proptest::sample::select(DiceState::all()).boxed()
        }
    }
}


///////////
// Tests //
///////////
