//! Pair generation and the weekly rotation predicate

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::Pair;

/// Partner given to the leftover user when the roster has odd size
pub const NO_PARTNER: &str = "No Partner";

/// Whole days after which pairs rotate
pub const ROTATION_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Shuffle `users` and group them two by two using the thread-local RNG.
pub fn generate_pairs(users: &[String]) -> Vec<Pair> {
    generate_pairs_with(users, &mut rand::rng())
}

/// Shuffle `users` with `rng` (Fisher-Yates) and group consecutive entries.
///
/// An odd trailing user is paired with [`NO_PARTNER`]. The input is not modified.
pub fn generate_pairs_with<R: Rng + ?Sized>(users: &[String], rng: &mut R) -> Vec<Pair> {
    let mut shuffled = users.to_vec();
    shuffled.shuffle(rng);

    let mut pairs = Vec::with_capacity(shuffled.len().div_ceil(2));
    let mut remaining = shuffled.into_iter();
    while let Some(first) = remaining.next() {
        let second = remaining.next().unwrap_or_else(|| NO_PARTNER.to_string());
        pairs.push(Pair(first, second));
    }
    pairs
}

/// Whether pairs are due for rotation at `now`.
///
/// Never-rotated documents are always due. Otherwise the elapsed wall-clock
/// milliseconds are floored to whole days and compared against a week. No
/// timezone or DST normalisation is done.
pub fn is_new_week(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_updated {
        None => true,
        Some(last) => {
            let elapsed_ms = (now - last).num_milliseconds();
            elapsed_ms.div_euclid(MILLIS_PER_DAY) >= ROTATION_DAYS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn occurrences(pairs: &[Pair]) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for pair in pairs {
            for name in pair.members() {
                *counts.entry(name.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn test_empty_roster_yields_no_pairs() {
        assert!(generate_pairs(&[]).is_empty());
    }

    #[test]
    fn test_single_user_gets_no_partner() {
        let pairs = generate_pairs(&names(&["Alice"]));
        assert_eq!(pairs, vec![Pair::new("Alice", NO_PARTNER)]);
    }

    #[test]
    fn test_even_roster() {
        let users = names(&["Alice", "Bob", "Charlie", "Diana"]);
        let pairs = generate_pairs(&users);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| !p.contains(NO_PARTNER)));

        let counts = occurrences(&pairs);
        for user in &users {
            assert_eq!(counts.get(user), Some(&1));
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let users = names(&["Alice", "Bob", "Charlie", "Diana", "Eve"]);
        let a = generate_pairs_with(&users, &mut StdRng::seed_from_u64(7));
        let b = generate_pairs_with(&users, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_reaches_every_partner() {
        let users = names(&["Alice", "Bob", "Charlie", "Diana"]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut alice_partners = std::collections::HashSet::new();

        for _ in 0..200 {
            for pair in generate_pairs_with(&users, &mut rng) {
                if pair.0 == "Alice" {
                    alice_partners.insert(pair.1.clone());
                } else if pair.1 == "Alice" {
                    alice_partners.insert(pair.0.clone());
                }
            }
        }

        assert_eq!(alice_partners.len(), 3);
    }

    #[test]
    fn test_is_new_week_without_timestamp() {
        assert!(is_new_week(None, Utc::now()));
    }

    #[test]
    fn test_is_new_week_boundaries() {
        let last = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        assert!(!is_new_week(Some(last), last));
        assert!(!is_new_week(Some(last), last + Duration::days(6)));
        assert!(!is_new_week(
            Some(last),
            last + Duration::days(7) - Duration::milliseconds(1)
        ));
        assert!(is_new_week(Some(last), last + Duration::days(7)));
        assert!(is_new_week(Some(last), last + Duration::days(30)));
    }

    #[test]
    fn test_future_timestamp_is_not_due() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(!is_new_week(Some(now + Duration::days(3)), now));
    }

    proptest! {
        #[test]
        fn prop_every_user_appears_exactly_once(
            users in prop::collection::hash_set("[A-Za-z]{1,8}", 1..40),
            seed in any::<u64>(),
        ) {
            let users: Vec<String> = users.into_iter().collect();
            let pairs = generate_pairs_with(&users, &mut StdRng::seed_from_u64(seed));
            let counts = occurrences(&pairs);

            prop_assert_eq!(pairs.len(), users.len().div_ceil(2));
            for user in &users {
                prop_assert_eq!(counts.get(user).copied(), Some(1));
            }

            let sentinel_pairs = pairs.iter().filter(|p| p.1 == NO_PARTNER).count();
            prop_assert_eq!(sentinel_pairs, users.len() % 2);
        }

        #[test]
        fn prop_is_new_week_matches_floored_days(elapsed_ms in 0i64..(30 * MILLIS_PER_DAY)) {
            let last = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
            let now = last + Duration::milliseconds(elapsed_ms);
            prop_assert_eq!(is_new_week(Some(last), now), elapsed_ms / MILLIS_PER_DAY >= 7);
        }
    }
}
