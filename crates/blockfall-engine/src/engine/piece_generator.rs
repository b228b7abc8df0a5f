use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ParsePieceSeedError, PieceKind, Randomizer};

/// Draws piece kinds from a seeded generator.
///
/// # Randomizers
///
/// - [`Randomizer::Uniform`]: every draw picks one of the seven kinds with
///   equal probability, independently of earlier draws.
/// - [`Randomizer::SevenBag`]: all seven kinds are shuffled into a bag and
///   drawn in order; a new bag is shuffled once the previous one runs out, so
///   every run of seven draws aligned to a bag boundary contains each kind
///   exactly once.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceGenerator, PieceSeed, Randomizer};
///
/// let seed = PieceSeed::from(42_u128);
/// let mut a = PieceGenerator::with_seed(Randomizer::SevenBag, seed);
/// let mut b = PieceGenerator::with_seed(Randomizer::SevenBag, seed);
/// for _ in 0..14 {
///     assert_eq!(a.next_piece(), b.next_piece());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    randomizer: Randomizer,
    bag: VecDeque<PieceKind>,
}

impl PieceGenerator {
    /// Creates a generator seeded from the thread-local random source.
    #[must_use]
    pub fn new(randomizer: Randomizer) -> Self {
        Self::with_seed(randomizer, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(randomizer: Randomizer, seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            randomizer,
            bag: VecDeque::with_capacity(PieceKind::LEN),
        }
    }

    #[must_use]
    pub fn randomizer(&self) -> Randomizer {
        self.randomizer
    }

    /// Draws the next piece kind.
    pub fn next_piece(&mut self) -> PieceKind {
        match self.randomizer {
            Randomizer::Uniform => self.rng.random(),
            Randomizer::SevenBag => loop {
                if let Some(kind) = self.bag.pop_front() {
                    return kind;
                }
                self.fill_bag();
            },
        }
    }

    fn fill_bag(&mut self) {
        let mut new_bag = PieceKind::ALL;
        new_bag.shuffle(&mut self.rng);
        self.bag.extend(new_bag);
    }
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed used to initialize the random number
/// generator for piece generation. Using the same seed with the same
/// randomizer reproduces the same piece sequence, which makes sessions
/// replayable and tests deterministic.
///
/// Seeds are written as 32 hexadecimal digits, both in JSON and on the
/// command line.
///
/// # Example
///
/// ```
/// use blockfall_engine::PieceSeed;
///
/// let seed: PieceSeed = "0123456789abcdeffedcba9876543210".parse().unwrap();
/// assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
/// assert!("xyz".parse::<PieceSeed>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    const HEX_LEN: usize = 32;

    #[must_use]
    pub const fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }
}

impl From<u128> for PieceSeed {
    fn from(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.to_u128())
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN {
            return Err(ParsePieceSeedError::InvalidLength { len: s.len() });
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParsePieceSeedError::InvalidDigit {
                input: s.to_owned(),
            });
        }
        u128::from_str_radix(s, 16)
            .map(Self::from)
            .map_err(|_| ParsePieceSeedError::InvalidDigit {
                input: s.to_owned(),
            })
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values using the standard random distribution.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}
