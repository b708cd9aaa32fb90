// src/selector.rs

use rand::seq::SliceRandom;

/// Draws the question set for one attempt from a quiz's active question pool.
///
/// When the pool is no larger than `sample_size` the entire pool is returned
/// in stored order. Otherwise a uniform random sample without replacement of
/// exactly `sample_size` ids is drawn. The returned sequence is recorded into
/// the attempt session once and reused verbatim for every later step; this
/// function must never be re-invoked mid-attempt.
pub fn select_question_ids(pool: Vec<i64>, sample_size: usize) -> Vec<i64> {
    if pool.len() <= sample_size {
        return pool;
    }

    let mut rng = rand::thread_rng();
    pool.choose_multiple(&mut rng, sample_size)
        .copied()
        .collect()
}
