use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::schemas::questions::GeneratedQuestion;

/// Seed for one quiz: the configured fixed seed when present, otherwise fresh entropy.
pub(crate) fn quiz_seed(configured: Option<u64>) -> u64 {
    configured.unwrap_or_else(rand::random)
}

pub(crate) fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Answer plus its three distractors in uniformly random order (Fisher-Yates).
pub(crate) fn shuffled_options<R: Rng + ?Sized>(
    question: &GeneratedQuestion,
    rng: &mut R,
) -> Vec<String> {
    let mut options = vec![
        question.option1.clone(),
        question.option2.clone(),
        question.option3.clone(),
        question.answer.clone(),
    ];
    options.shuffle(rng);
    options
}
