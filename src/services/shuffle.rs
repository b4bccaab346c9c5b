use crate::services::seeded_random::SeededRandom;

/// Fisher-Yates over a copy of `items`, driven by `seed`. Inputs with fewer
/// than two elements come back unchanged without drawing.
pub fn shuffle_deterministic<T: Clone>(items: &[T], seed: &str) -> Vec<T> {
    let mut result = items.to_vec();
    shuffle_in_place(&mut result, seed);
    result
}

pub fn shuffle_in_place<T>(items: &mut [T], seed: &str) {
    if items.len() < 2 {
        return;
    }

    let mut rng = SeededRandom::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}
