use rand::Rng;
use rand::seq::SliceRandom;
use tracing::trace;

use crate::model::{DigitClass, DigitRange};

/// Number of answer options shown, including the correct one.
pub const OPTION_COUNT: usize = 4;

/// Random proposals tried before switching to the deterministic walk.
const RANDOM_ATTEMPTS: usize = 64;

/// Build the shuffled option set: `correct` plus three distinct decoys.
///
/// Decoys are first drawn near the answer using the class offsets. If the
/// window is too narrow to yield enough distinct values, the remaining slots
/// are filled by walking outward from the answer in offset-sized steps, which
/// always terminates.
pub(crate) fn build_options<R: Rng + ?Sized>(
    correct: u64,
    class: DigitClass,
    rng: &mut R,
) -> Vec<u64> {
    let DigitRange { min, max } = class.range();
    let offsets = class.decoy_offsets();
    let window = Window {
        floor: min / 2,
        ceiling: max.max(min / 2),
        min_distance: min / 4,
    };

    let mut options = Vec::with_capacity(OPTION_COUNT);
    options.push(correct);

    for attempt in 0..RANDOM_ATTEMPTS {
        if options.len() == OPTION_COUNT {
            break;
        }
        let candidate = window.propose(correct, &offsets, rng);
        trace!(attempt, candidate, "decoy proposal");
        if !options.contains(&candidate) {
            options.push(candidate);
        }
    }

    let unit = offsets[0].max(1);
    let mut step = 1_u64;
    while options.len() < OPTION_COUNT {
        let reach = unit.saturating_mul(step);
        for candidate in [correct.checked_add(reach), correct.checked_sub(reach)]
            .into_iter()
            .flatten()
        {
            if options.len() < OPTION_COUNT && !options.contains(&candidate) {
                trace!(step, candidate, "widened decoy");
                options.push(candidate);
            }
        }
        step += 1;
    }

    options.shuffle(rng);
    options
}

/// Acceptance window for random proposals.
struct Window {
    floor: u64,
    ceiling: u64,
    /// Proposals closer than this to the answer are pushed out to exactly this distance.
    min_distance: u64,
}

impl Window {
    fn propose<R: Rng + ?Sized>(&self, correct: u64, offsets: &[u64], rng: &mut R) -> u64 {
        let offset = offsets[rng.random_range(0..offsets.len())];
        let shifted = if rng.random_bool(0.5) {
            correct.saturating_add(offset)
        } else {
            correct.saturating_sub(offset)
        };
        let candidate = shifted.clamp(self.floor, self.ceiling);

        if candidate.abs_diff(correct) >= self.min_distance {
            return candidate;
        }
        let pushed = if rng.random_bool(0.5) {
            correct.saturating_add(self.min_distance)
        } else {
            correct.saturating_sub(self.min_distance)
        };
        pushed.clamp(self.floor, self.ceiling)
    }
}
