use crate::{
    dice::InitStrategy,
    driver::{run_games, seeded_rng, Seed, Tally},
    stats::wilson_interval,
    DEFAULT_NUM_GAMES,
};
use log::info;
use std::{fmt, str::FromStr};
use tabular::{row, Table};
use trice::Instant;

/// Confidence level for the reported win rate interval.
const WIN_RATE_CONFIDENCE: f64 = 0.99;

///////////////////////////
// String parser helpers //
///////////////////////////

fn parse_opt<T>(label: &'static str, opt_s: Option<&str>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    opt_s
        .map(T::from_str)
        .transpose()
        .map_err(|err| format!("invalid {label}: {err}"))
}

/// Like `u64::from_str`, but allows `_` digit separators, e.g. `50_000_000`.
fn parse_count(s: &str) -> Result<u64, String> {
    s.replace('_', "")
        .parse::<u64>()
        .map_err(|err| err.to_string())
}

//////////////////////
// CLI Args Wrapper //
//////////////////////

pub struct Args(pico_args::Arguments);

impl Args {
    pub fn new(inner: pico_args::Arguments) -> Self {
        Self(inner)
    }

    fn opt_value(&mut self, keys: impl Into<pico_args::Keys>) -> Result<Option<String>, String> {
        self.0
            .opt_value_from_fn(keys, |s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn flag(&mut self, keys: impl Into<pico_args::Keys>) -> bool {
        self.0.contains(keys)
    }

    fn expect_finished(self) -> Result<(), String> {
        let remaining = self.0.finish();
        if !remaining.is_empty() {
            Err(format!("unexpected arguments left: '{:?}'", remaining))
        } else {
            Ok(())
        }
    }

    fn maybe_help(&mut self, usage: &str) {
        if self.0.contains(["-h", "--help"]) {
            print!("{}", usage);
            std::process::exit(0);
        }
    }
}

/////////////
// Metrics //
/////////////

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metrics(pub Vec<(String, String)>);

impl Metrics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((label.into(), value.into()));
        self
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new("{:>}  {:<}");

        for (label, value) in &self.0 {
            table.add_row(row!(label, value));
        }

        table
    }
}

///////////////////
// Command trait //
///////////////////

pub trait Command: Sized {
    const USAGE: &'static str;

    type Output: fmt::Display;

    fn try_from_cli_args(args: Args) -> Result<Self, String>;
    fn run(self) -> Result<Self::Output, String>;
}

/////////////////////
// SimulateCommand //
/////////////////////

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulateCommand {
    num_games: u64,
    seed: Seed,
    init: InitStrategy,
    show_metrics: bool,
}

impl Default for SimulateCommand {
    fn default() -> Self {
        Self {
            num_games: DEFAULT_NUM_GAMES,
            seed: Seed::Entropy,
            init: InitStrategy::Independent,
            show_metrics: false,
        }
    }
}

impl SimulateCommand {
    pub fn try_from_str_args(
        num_games: Option<&str>,
        seed: Option<&str>,
        init: Option<&str>,
        show_metrics: bool,
    ) -> Result<Self, String> {
        let num_games = num_games
            .map(parse_count)
            .transpose()
            .map_err(|err| format!("invalid number of games: {err}"))?
            .unwrap_or(DEFAULT_NUM_GAMES);

        if num_games == 0 {
            return Err("the number of games must be at least 1".to_string());
        }

        Ok(Self {
            num_games,
            seed: parse_opt("seed", seed)?.unwrap_or_default(),
            init: parse_opt("init strategy", init)?.unwrap_or_default(),
            show_metrics,
        })
    }
}

impl Command for SimulateCommand {
    const USAGE: &'static str = "\
uniqdice - play lots of games of \"reroll the duplicates\" and count the wins

Roll four 4-sided dice. Reroll any dice that match another die, keep the rest.
You win once every die is different, and lose if all four come up the same.

USAGE:
    uniqdice [option ...]

EXAMPLES:
    uniqdice
    uniqdice -n 1_000_000 -s 42 --metrics

OPTIONS:
    · --games / -n count (default: 50_000_000)
      How many games to play.

    · --seed / -s seed (default: from OS entropy)
      Seed the random number generator for a reproducible run. Decimal or
      0x-prefixed hex.

    · --init / -i independent|stars-and-bars (default: independent)
      How the dice are dealt at the start of each game. `independent` rolls
      four real dice and wins about 96.22% of games. `stars-and-bars`
      reproduces the (slightly biased) statistics of older versions, which
      win about 95.75%.

    · --metrics / -m
      Print run metrics (duration, win rate confidence interval, mean rolls
      per game, seed) to stderr.
";

    type Output = SimulateCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(Self::USAGE);

        let num_games = args.opt_value(["-n", "--games"])?;
        let seed = args.opt_value(["-s", "--seed"])?;
        let init = args.opt_value(["-i", "--init"])?;
        let show_metrics = args.flag(["-m", "--metrics"]);
        args.expect_finished()?;

        Self::try_from_str_args(
            num_games.as_deref(),
            seed.as_deref(),
            init.as_deref(),
            show_metrics,
        )
    }

    fn run(self) -> Result<Self::Output, String> {
        let seed = self.seed.resolve();
        info!("simulate: games: {}, init: {}, seed: {seed:#x}", self.num_games, self.init);

        let start_time = Instant::now();
        let tally = run_games(self.num_games, seeded_rng(seed), self.init);
        let run_duration = start_time.elapsed();

        info!("simulate: finished in {:.2?}", run_duration);

        let metrics = if self.show_metrics {
            let (win_lo, win_hi) = wilson_interval(tally.won, tally.games(), WIN_RATE_CONFIDENCE)?;
            let games_per_sec = tally.games() as f64 / run_duration.as_secs_f64();

            let mut metrics = Metrics::new();
            metrics.push("run duration", format!("{:.2?}", run_duration));
            metrics.push("games/sec", format!("{:.0}", games_per_sec));
            metrics.push("win rate", format!("{:.6}", tally.win_rate()));
            metrics.push(
                format!("{:.0}% interval", WIN_RATE_CONFIDENCE * 100.0),
                format!("[{:.6}, {:.6}]", win_lo, win_hi),
            );
            metrics.push("mean rolls", format!("{:.4}", tally.mean_rolls()));
            metrics.push("init", self.init.to_string());
            metrics.push("seed", format!("{seed:#x}"));
            Some(metrics)
        } else {
            None
        };

        Ok(SimulateCommandOutput { tally, metrics })
    }
}

#[derive(Clone, Debug)]
pub struct SimulateCommandOutput {
    pub tally: Tally,
    pub metrics: Option<Metrics>,
}

/// Only the summary; metrics are reported separately on stderr.
impl fmt::Display for SimulateCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tally, f)
    }
}
