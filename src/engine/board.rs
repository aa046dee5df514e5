use rand::Rng;
use rand::seq::SliceRandom;

use super::state::Tile;

/// Deals a board: every identifier twice, uniformly permuted, ids assigned by final position.
pub fn build_board<R: Rng + ?Sized>(content: &[String], rng: &mut R) -> Vec<Tile> {
    let mut values: Vec<&str> = Vec::with_capacity(content.len() * 2);
    for value in content {
        values.push(value);
        values.push(value);
    }

    // Fisher-Yates; every permutation is equally likely.
    values.shuffle(rng);

    values
        .into_iter()
        .enumerate()
        .map(|(id, value)| Tile::new(id, value))
        .collect()
}

/// True when every content value on the board appears exactly twice.
pub fn is_well_paired(tiles: &[Tile]) -> bool {
    use std::collections::HashMap;

    if tiles.len() % 2 != 0 {
        return false;
    }
    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(tiles.len() / 2);
    for tile in tiles {
        *counts.entry(tile.value.as_str()).or_default() += 1;
    }
    counts.values().all(|&count| count == 2)
        && tiles.iter().enumerate().all(|(idx, tile)| tile.id == idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::TileStatus;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn content(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn board_starts_hidden_with_positional_ids() {
        let mut rng = StdRng::seed_from_u64(3);
        let tiles = build_board(&content(4), &mut rng);
        assert_eq!(tiles.len(), 8);
        for (idx, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.id, idx);
            assert_eq!(tile.status, TileStatus::Hidden);
            assert!(!tile.hinted);
        }
    }

    #[test]
    fn empty_content_deals_empty_board() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(build_board(&[], &mut rng).is_empty());
    }

    #[test]
    fn odd_board_is_not_well_paired() {
        let tiles = vec![Tile::new(0, "a"), Tile::new(1, "a"), Tile::new(2, "b")];
        assert!(!is_well_paired(&tiles));
    }

    #[test]
    fn positions_are_uniform() {
        // Tracks where the first copy of "c0" lands across many deals.
        const TRIALS: usize = 40_000;
        let pair_count = 4;
        let tile_count = pair_count * 2;
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut hits = vec![0usize; tile_count];

        for _ in 0..TRIALS {
            let tiles = build_board(&content(pair_count), &mut rng);
            for tile in tiles.iter().filter(|t| t.value == "c0") {
                hits[tile.id] += 1;
            }
        }

        // Two copies per deal, spread over `tile_count` slots.
        let expected = (TRIALS * 2) as f64 / tile_count as f64;
        for (position, &count) in hits.iter().enumerate() {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(
                deviation < 0.05,
                "position {position} got {count} hits, expected ~{expected}"
            );
        }
    }

    proptest! {
        #[test]
        fn every_value_appears_twice(pair_count in 0usize..24, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let tiles = build_board(&content(pair_count), &mut rng);
            prop_assert_eq!(tiles.len(), pair_count * 2);
            prop_assert!(is_well_paired(&tiles));
        }
    }
}
