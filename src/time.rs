// Tick-source support for time-aware integration and differentiation.

use alloc::boxed::Box;

/// A callable returning a monotonic, unsigned tick count.
///
/// The controller only ever takes differences between consecutive samples,
/// so the unit (milliseconds, microseconds, hardware timer counts) is the
/// caller's choice; the integral and derivative terms are simply scaled by
/// it. The counter must be monotonic, and compensating for rollover of the
/// underlying hardware counter is the caller's responsibility.
pub type TickSource = Box<dyn FnMut() -> u64>;

#[cfg(feature = "std")]
mod system_millis {

    /// A millisecond tick counter anchored at its construction time,
    /// satisfying the [`TickSource`](super::TickSource) contract.
    ///
    /// ```
    /// use pidloop::time::SystemMillis;
    ///
    /// let clock = SystemMillis::now();
    /// let mut ticks = move || clock.ticks();
    /// let earlier = ticks();
    /// assert!(ticks() >= earlier);
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct SystemMillis {
        epoch: std::time::Instant,
    }

    impl SystemMillis {
        /// Starts counting from now.
        pub fn now() -> Self {
            SystemMillis {
                epoch: std::time::Instant::now(),
            }
        }

        /// Milliseconds elapsed since construction.
        pub fn ticks(&self) -> u64 {
            self.epoch.elapsed().as_millis() as u64
        }
    }

    /// Tests that the counter never runs backwards.
    #[cfg(test)]
    #[test]
    fn test_system_millis_monotonic() {
        let clock = SystemMillis::now();
        let earlier = clock.ticks();
        let later = clock.ticks();
        assert!(later >= earlier);
    }
}

#[cfg(feature = "std")]
pub use system_millis::SystemMillis;
