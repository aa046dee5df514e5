//! Content selection for a deal: caller-supplied items first, generated filler for the rest.

use std::collections::HashSet;

use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x";
const AVATAR_SEED_LEN: usize = 10;

#[rustfmt::skip]
const SYMBOLS: [&str; 60] = [
    // Animals
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵",
    // Fruits
    "🍏", "🍎", "🍐", "🍊", "🍋", "🍌", "🍉", "🍇", "🍓", "🫐", "🍒", "🍑", "🥭", "🍍", "🥥",
    // Sports
    "⚽", "🏀", "🏈", "⚾", "🥎", "🎾", "🏐", "🏉", "🥏", "🎱", "🏓", "🏸", "🏒", "🏑", "🪀",
    // Objects
    "🎨", "🎬", "🎤", "🎧", "🎮", "🎯", "🎲", "🎳", "🚀", "🚁", "🚂", "🚢", "🪐", "⛵", "🚲",
];

/// Source of fresh content identifiers when the caller supplies too few.
pub trait FillerSource {
    fn generate(&mut self) -> String;
}

impl<F> FillerSource for F
where
    F: FnMut() -> String,
{
    fn generate(&mut self) -> String {
        self()
    }
}

/// Seeded avatar URLs, one random seed per call.
pub struct AvatarFiller {
    style: String,
    rng: StdRng,
}

impl AvatarFiller {
    pub fn new(style: impl Into<String>) -> Self {
        AvatarFiller {
            style: style.into(),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(style: impl Into<String>, seed: u64) -> Self {
        AvatarFiller {
            style: style.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for AvatarFiller {
    fn default() -> Self {
        AvatarFiller::new("bottts")
    }
}

impl FillerSource for AvatarFiller {
    fn generate(&mut self) -> String {
        let seed: String = (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(AVATAR_SEED_LEN)
            .map(char::from)
            .collect();
        format!("{AVATAR_BASE_URL}/{}/svg?seed={seed}", self.style)
    }
}

/// Draws emoji from a shuffled pool; once the pool runs dry it hands out avatar URLs.
pub struct SymbolFiller {
    pool: Vec<&'static str>,
    fallback: AvatarFiller,
}

impl SymbolFiller {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut pool = SYMBOLS.to_vec();
        pool.shuffle(rng);
        SymbolFiller {
            pool,
            fallback: AvatarFiller::with_seed("bottts", rng.next_u64()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.pool.len()
    }
}

impl FillerSource for SymbolFiller {
    fn generate(&mut self) -> String {
        match self.pool.pop() {
            Some(symbol) => symbol.to_string(),
            None => self.fallback.generate(),
        }
    }
}

/// Returns exactly `pair_count` distinct identifiers.
///
/// Supplied items keep their order and are truncated to `pair_count`; repeats among them are
/// dropped. Generated items that collide with one already chosen get a numeric suffix.
pub fn resolve_content(
    supplied: &[String],
    pair_count: usize,
    filler: &mut dyn FillerSource,
) -> Vec<String> {
    let mut seen = HashSet::with_capacity(pair_count);
    let mut content = Vec::with_capacity(pair_count);

    for item in supplied {
        if content.len() == pair_count {
            break;
        }
        if seen.insert(item.clone()) {
            content.push(item.clone());
        }
    }

    let supplied_count = content.len();
    while content.len() < pair_count {
        let base = filler.generate();
        let mut value = base.clone();
        let mut suffix = 1u32;
        while seen.contains(&value) {
            suffix += 1;
            value = format!("{base}#{suffix}");
        }
        seen.insert(value.clone());
        content.push(value);
    }

    if supplied_count < pair_count {
        tracing::debug!(
            supplied = supplied_count,
            generated = pair_count - supplied_count,
            "filled content pool"
        );
    }
    content
}
