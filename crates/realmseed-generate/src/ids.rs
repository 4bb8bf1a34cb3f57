use std::collections::HashSet;

use rand::Rng;

/// Draw a `{prefix}_{8 hex}` id that is not in `taken`, and reserve it.
pub fn unique_id<R: Rng + ?Sized>(prefix: &str, rng: &mut R, taken: &mut HashSet<String>) -> String {
    loop {
        let id = format!("{prefix}_{:08x}", rng.random::<u32>());
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

/// FNV-1a over `key`, mixed with `seed`.
pub fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Uniform index into a non-empty slice.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, values: &'a [T]) -> &'a T {
    &values[rng.random_range(0..values.len())]
}

/// `amount` distinct elements of `values`, in draw order.
pub fn sample<'a, T, R: Rng + ?Sized>(rng: &mut R, values: &'a [T], amount: usize) -> Vec<&'a T> {
    let amount = amount.min(values.len());
    rand::seq::index::sample(rng, values.len(), amount)
        .into_iter()
        .map(|index| &values[index])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut taken = HashSet::new();
        let first = unique_id("char", &mut rng, &mut taken);
        let second = unique_id("char", &mut rng, &mut taken);
        assert!(first.starts_with("char_"));
        assert_eq!(first.len(), "char_".len() + 8);
        assert_ne!(first, second);
        assert_eq!(taken.len(), 2);
    }

    #[test]
    fn hash_seed_separates_phase_streams() {
        assert_ne!(hash_seed(7, "characters"), hash_seed(7, "quests"));
        assert_eq!(hash_seed(7, "levels"), hash_seed(7, "levels"));
    }

    #[test]
    fn sample_never_repeats_or_overflows() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let values = ["a", "b", "c"];
        let picked = sample(&mut rng, &values, 5);
        assert_eq!(picked.len(), 3);
        let unique: HashSet<_> = picked.into_iter().collect();
        assert_eq!(unique.len(), 3);
    }
}
