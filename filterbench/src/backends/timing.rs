use std::time::{Duration, Instant};

use strum_macros::Display;

use crate::common::Result;

/// Phases of one backend invocation, used to tag log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Setup,
    Warmup,
    TimedLoop,
    Teardown,
}

/// Wall-clock bounds of a timed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub start: Instant,
    pub end: Instant,
}

impl Timing {
    pub fn elapsed(&self) -> Duration {
        self.end.duration_since(self.start)
    }

    /// Mean milliseconds per iteration, `None` when nothing was timed.
    pub fn average_ms(&self, iterations: u32) -> Option<f64> {
        (iterations > 0).then(|| self.elapsed().as_secs_f64() * 1e3 / iterations as f64)
    }
}

/// Runs one untimed warm-up `dispatch`, then `iterations` timed ones.
///
/// `sync` blocks until all submitted work has finished. It is called after
/// the warm-up, before the clock starts, and once more after the last
/// timed dispatch, before the clock stops.
pub(crate) fn run_timed(
    iterations: u32,
    mut dispatch: impl FnMut() -> Result<()>,
    mut sync: impl FnMut() -> Result<()>,
) -> Result<Timing> {
    tracing::trace!(stage = %Stage::Warmup, "dispatching");
    dispatch()?;
    sync()?;

    tracing::trace!(stage = %Stage::TimedLoop, iterations, "dispatching");
    let start = Instant::now();
    for _ in 0..iterations {
        dispatch()?;
    }
    sync()?;
    let end = Instant::now();

    Ok(Timing { start, end })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::common::Error;

    #[test]
    fn warmup_is_synchronized_before_the_clock_starts() {
        let calls = RefCell::new(Vec::new());

        run_timed(
            3,
            || {
                calls.borrow_mut().push("dispatch");
                Ok(())
            },
            || {
                calls.borrow_mut().push("sync");
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(
            calls.into_inner(),
            ["dispatch", "sync", "dispatch", "dispatch", "dispatch", "sync"]
        );
    }

    #[test]
    fn zero_iterations_still_warm_up() {
        let mut dispatches = 0;
        let timing = run_timed(
            0,
            || {
                dispatches += 1;
                Ok(())
            },
            || Ok(()),
        )
        .unwrap();

        assert_eq!(dispatches, 1);
        assert_eq!(timing.average_ms(0), None);
    }

    #[test]
    fn dispatch_errors_stop_the_loop() {
        let mut dispatches = 0;
        let result = run_timed(
            5,
            || {
                dispatches += 1;
                if dispatches == 2 {
                    return Err(Error::execution("dispatching", "lost device"));
                }
                Ok(())
            },
            || Ok(()),
        );

        assert!(matches!(result, Err(Error::Execution { .. })));
        assert_eq!(dispatches, 2);
    }

    #[test]
    fn average_divides_by_iterations() {
        let start = Instant::now();
        let timing = Timing {
            start,
            end: start + Duration::from_millis(8),
        };

        let average = timing.average_ms(4).unwrap();
        assert!((average - 2.0).abs() < 1e-9);
    }
}
