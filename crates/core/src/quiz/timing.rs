use std::time::Duration;

/// Floor on how long any step is shown.
pub const MIN_STEP_DURATION: Duration = Duration::from_millis(100);

/// Split the total reveal budget evenly across all steps, terminal included.
///
/// A `step_count` of zero is treated as one.
#[must_use]
pub fn step_duration(speed_secs: u32, step_count: usize) -> Duration {
    let steps = u32::try_from(step_count.max(1)).unwrap_or(u32::MAX);
    let per_step = Duration::from_secs(u64::from(speed_secs)) / steps;
    per_step.max(MIN_STEP_DURATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_over_three_steps() {
        assert_eq!(step_duration(1, 3).as_millis(), 333);
    }

    #[test]
    fn floor_applies_to_crowded_reveals() {
        assert_eq!(step_duration(1, 21), MIN_STEP_DURATION);
        assert_eq!(step_duration(0, 3), MIN_STEP_DURATION);
    }

    #[test]
    fn zero_steps_uses_whole_budget() {
        assert_eq!(step_duration(2, 0), Duration::from_secs(2));
    }
}
