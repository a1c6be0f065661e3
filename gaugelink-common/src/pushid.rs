//! Chronologically ordered identifiers for appended records.
//!
//! An id is 20 characters: 8 characters of millisecond timestamp followed
//! by 12 random characters, all drawn from an alphabet whose ASCII order
//! matches its numeric order. Sorting ids lexicographically sorts records
//! by creation time.

use rand::Rng;

use crate::reading::current_timestamp_millis;

/// Alphabet in ascending ASCII order.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Number of characters encoding the timestamp.
const TIME_CHARS: usize = 8;

/// Number of random characters.
const RANDOM_CHARS: usize = 12;

/// Length of a push id.
pub const PUSH_ID_LEN: usize = TIME_CHARS + RANDOM_CHARS;

/// Generator for push ids.
///
/// Ids created within the same millisecond reuse the previous random part
/// incremented by one, so every id is strictly greater than the last.
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last_time: i64,
    last_random: [u8; RANDOM_CHARS],
}

impl PushIdGenerator {
    /// Create a new generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate an id for the current time.
    pub fn generate(&mut self) -> String {
        self.generate_at(current_timestamp_millis(), &mut rand::rng())
    }

    /// Generate an id for a given timestamp using the provided RNG.
    pub fn generate_at<R: Rng>(&mut self, now_ms: i64, rng: &mut R) -> String {
        // A clock that steps backwards must not break ordering.
        let now_ms = now_ms.max(self.last_time);

        if now_ms == self.last_time && self.last_time != 0 {
            self.increment_random();
        } else {
            for slot in self.last_random.iter_mut() {
                *slot = rng.random_range(0..64u8);
            }
        }
        self.last_time = now_ms;

        let mut id = String::with_capacity(PUSH_ID_LEN);
        id.push_str(&encode_time(now_ms));
        for &idx in &self.last_random {
            id.push(PUSH_CHARS[idx as usize] as char);
        }
        id
    }

    fn increment_random(&mut self) {
        for slot in self.last_random.iter_mut().rev() {
            if *slot == 63 {
                *slot = 0;
            } else {
                *slot += 1;
                return;
            }
        }
    }
}

fn encode_time(mut now_ms: i64) -> String {
    let mut chars = [b'-'; TIME_CHARS];
    for slot in chars.iter_mut().rev() {
        *slot = PUSH_CHARS[(now_ms.rem_euclid(64)) as usize];
        now_ms = now_ms.div_euclid(64);
    }
    chars.iter().map(|&c| c as char).collect()
}

/// Recover the millisecond timestamp encoded in a push id.
///
/// Returns `None` if `id` is not a well-formed push id.
pub fn decode_timestamp(id: &str) -> Option<i64> {
    if id.len() != PUSH_ID_LEN {
        return None;
    }
    let mut value: i64 = 0;
    for byte in id.bytes().take(TIME_CHARS) {
        let digit = PUSH_CHARS.iter().position(|&c| c == byte)?;
        value = value * 64 + digit as i64;
    }
    if !id.bytes().skip(TIME_CHARS).all(|b| PUSH_CHARS.contains(&b)) {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_alphabet_is_sorted() {
        assert!(PUSH_CHARS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_id_shape() {
        let mut generator = PushIdGenerator::new();
        let id = generator.generate();
        assert_eq!(id.len(), PUSH_ID_LEN);
        assert!(id.bytes().all(|b| PUSH_CHARS.contains(&b)));
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let mut generator = PushIdGenerator::new();
        let mut rng = SmallRng::seed_from_u64(7);
        let id = generator.generate_at(1_700_000_000_123, &mut rng);
        assert_eq!(decode_timestamp(&id), Some(1_700_000_000_123));
        assert_eq!(decode_timestamp("short"), None);
    }

    #[test]
    fn test_same_millisecond_is_strictly_ordered() {
        let mut generator = PushIdGenerator::new();
        let mut rng = SmallRng::seed_from_u64(42);

        let ids: Vec<String> = (0..200)
            .map(|_| generator.generate_at(1_700_000_000_000, &mut rng))
            .collect();

        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_later_time_sorts_later() {
        let mut generator = PushIdGenerator::new();
        let mut rng = SmallRng::seed_from_u64(1);

        let first = generator.generate_at(1_000, &mut rng);
        let second = generator.generate_at(1_001, &mut rng);
        let third = generator.generate_at(64 * 64, &mut rng);

        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_clock_going_backwards_keeps_order() {
        let mut generator = PushIdGenerator::new();
        let mut rng = SmallRng::seed_from_u64(3);

        let first = generator.generate_at(5_000, &mut rng);
        let second = generator.generate_at(4_000, &mut rng);
        assert!(first < second);
    }

    #[test]
    fn test_increment_carries() {
        let mut generator = PushIdGenerator {
            last_time: 10,
            last_random: [63; RANDOM_CHARS],
        };
        generator.last_random[0] = 5;
        generator.increment_random();
        assert_eq!(generator.last_random[0], 6);
        assert!(generator.last_random[1..].iter().all(|&d| d == 0));
    }
}
