//! # uniqdice
//!
//! A Monte Carlo sampler for a little dice solitaire game : )
//!
//! ## Rules
//!
//! Roll four 4-sided dice. Any dice that show the same face as another die are
//! picked up and rolled again, while dice showing a unique face stay on the
//! table. Keep going until either
//!
//! * every die shows a different face (you win), or
//! * all four dice show the same face (you lose).
//!
//! ## Explanation
//!
//! The board is tracked as a histogram over the four faces (see
//! [`dice::DiceState`]), which is all the game rules ever look at. The driver
//! plays a large number of independent games and reports how many were won
//! and lost.

#[macro_use]
mod macros;

pub mod cli;
pub mod dice;
pub mod driver;
pub mod game;
pub mod stats;

/// The number of dice on the table.
pub const NUM_DICE: u8 = 4;

/// The number of faces on each die.
pub const NUM_FACES: u8 = 4;

/// How many games the driver plays when not told otherwise.
pub const DEFAULT_NUM_GAMES: u64 = 50_000_000;

///////////////////
// Combinatorics //
///////////////////

/// The number of factorials to precompute in our static lookup table. Note this
/// number is chosen so as not to overflow a u32.
pub(crate) const NUM_FACTORIALS: usize = 13;

/// A precomputed lookup table of factorials from `0 <= n < NUM_FACTORIALS`.
/// `FACTORIAL_LT[n] = n!`.
const FACTORIAL_LT: [u32; NUM_FACTORIALS] = precompute_factorials();

const fn precompute_factorials() -> [u32; NUM_FACTORIALS] {
    let mut factorials: [u32; NUM_FACTORIALS] = [1; NUM_FACTORIALS];

    let mut idx = 1;
    while idx < NUM_FACTORIALS {
        factorials[idx] = (idx as u32) * factorials[idx - 1];
        idx += 1;
    }

    factorials
}

#[inline]
pub(crate) const fn factorial(n: u32) -> u32 {
    FACTORIAL_LT[n as usize]
}

/// count `n choose k` without replacement.
pub(crate) const fn num_combinations(n: u32, k: u32) -> u32 {
    factorial(n) / (factorial(k) * factorial(n - k))
}

/// count `n choose k` with replacement. also known as `n multichoose k`.
///
/// `num_multisets(NUM_FACES, NUM_DICE)` is the number of distinct dice states.
#[inline]
pub(crate) const fn num_multisets(n: u32, k: u32) -> u32 {
    num_combinations(n + k - 1, k)
}

/// The multinomial coefficient `(c_1 + .. + c_m)! / (c_1! * .. * c_m!)`, i.e.,
/// the number of distinct orderings of a multiset with element multiplicities
/// `counts`.
pub(crate) fn num_orderings(counts: &[u8]) -> u32 {
    let n: u32 = counts.iter().map(|&c| c as u32).sum();
    let denom: u32 = counts.iter().map(|&c| factorial(c as u32)).product();
    factorial(n) / denom
}

///////////
// Tests //
///////////
