//! PHQ-9 item bank and per-session sampling.

use rand::seq::SliceRandom;
use rand::Rng;

/// The nine PHQ-9 items, phrased as statements about the last two weeks.
pub const QUESTION_BANK: [&str; 9] = [
    "Over the last two weeks, have you had little interest or pleasure in doing things you usually enjoy?",
    "Have you been feeling down, depressed, or hopeless?",
    "Have you had trouble falling or staying asleep, or have you been sleeping too much?",
    "Have you been feeling tired or having little energy?",
    "Have you had a poor appetite, or have you been overeating?",
    "Have you been feeling bad about yourself, that you are a failure or have let yourself or your family down?",
    "Have you had trouble concentrating on things, such as reading the newspaper or watching television?",
    "Have you been moving or speaking so slowly that other people could have noticed, or the opposite, being so fidgety or restless that you have been moving around a lot more than usual?",
    "Have you had thoughts that you would be better off dead, or of hurting yourself in some way?",
];

/// Shown once every screening question has been answered.
pub const NARRATIVE_PROMPT: &str = "Finally, please write freely about how you are feeling right now, \
    as if you were writing in a diary. Anything at all is fine.";

/// Picks `count` distinct items in random order. `count` is capped at the bank size.
pub fn sample_questions<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    let mut items: Vec<&str> = QUESTION_BANK.to_vec();
    items.shuffle(rng);
    items
        .into_iter()
        .take(count.min(QUESTION_BANK.len()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_sample_is_distinct_and_from_bank() {
        let mut rng = StdRng::seed_from_u64(7);
        let sampled = sample_questions(&mut rng, 5);
        assert_eq!(sampled.len(), 5);

        let unique: HashSet<_> = sampled.iter().collect();
        assert_eq!(unique.len(), 5);
        assert!(sampled.iter().all(|q| QUESTION_BANK.contains(&q.as_str())));
    }

    #[test]
    fn test_sample_is_deterministic_for_seed() {
        let a = sample_questions(&mut StdRng::seed_from_u64(42), 5);
        let b = sample_questions(&mut StdRng::seed_from_u64(42), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_caps_at_bank_size() {
        let sampled = sample_questions(&mut StdRng::seed_from_u64(1), 50);
        assert_eq!(sampled.len(), QUESTION_BANK.len());
    }
}
