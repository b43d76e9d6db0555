// Closed-loop PID controller with injected feedback, output, and time
// callables. The per-cycle algorithm lives in `Controller::tick`.

use alloc::boxed::Box;

use crate::num::Sample;
use crate::time::TickSource;

/// A callable the controller invokes once per cycle to sample the process
/// variable.
pub type FeedbackSource<T> = Box<dyn FnMut() -> T>;

/// A callable the controller invokes once per cycle to deliver the computed
/// correction to the actuator.
pub type OutputSink<T> = Box<dyn FnMut(T)>;

/// Integral clamp used until the caller configures one. Large enough to be
/// effectively unbounded for typical gains, yet representable in every
/// supported sample type.
const DEFAULT_INTEGRAL_LIMIT: f64 = 30000.0;

/// Why a [`ControllerBuilder`] refused to produce a controller.
///
/// Runtime setters on [`Controller`] never signal; they silently retain the
/// prior configuration. The builder is the one place where an invalid
/// request is reported instead of dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ConfigError {
    /// Input bounds must satisfy `lower < upper`.
    #[cfg_attr(feature = "std", error("input bounds must satisfy lower < upper"))]
    InvalidInputBounds,

    /// Output bounds must satisfy `lower < upper`.
    #[cfg_attr(feature = "std", error("output bounds must satisfy lower < upper"))]
    InvalidOutputBounds,

    /// Wrap bounds must satisfy `lower < upper`.
    #[cfg_attr(feature = "std", error("wrap bounds must satisfy lower < upper"))]
    InvalidWrapBounds,

    /// The integral cumulation limit must exceed 1 in magnitude.
    #[cfg_attr(
        feature = "std",
        error("integral cumulation limit must exceed 1 in magnitude")
    )]
    InvalidIntegralLimit,
}

/// A closed-loop PID controller.
///
/// The controller owns two callables: a feedback source it samples at the
/// start of every [`tick`](Controller::tick), and an output sink it hands
/// the computed correction to at the end. An optional third callable, a
/// monotonic tick counter, switches the integral and derivative terms from
/// unit-time estimates to time-aware ones.
///
/// `tick` performs a bounded amount of arithmetic and exactly two callable
/// invocations (source, sink); it never blocks on its own. The controller
/// holds no locks: drive `tick` and the configuration setters from a single
/// logical execution context, or synchronize externally.
///
/// All three gains are expected to be non-negative. Negative gains are
/// accepted without validation but drive the system away from the target;
/// keeping them sane is the caller's responsibility.
pub struct Controller<T: Sample> {
    kp: f64,
    ki: f64,
    kd: f64,

    target: T,
    output: T,
    feedback: T,
    last_feedback: T,
    error: T,
    last_error: T,

    integral: T,
    max_cumulation: T,
    cycle_derivative: T,

    enabled: bool,

    input_bounded: bool,
    input_lower: T,
    input_upper: T,

    output_bounded: bool,
    output_lower: T,
    output_upper: T,

    wrapped: bool,
    wrap_lower: T,
    wrap_upper: T,

    source: FeedbackSource<T>,
    sink: OutputSink<T>,
    ticks: Option<TickSource>,
    last_time: u64,
}

/// Trims a value to `[lower, upper]`.
fn bound<T: Sample>(value: T, lower: T, upper: T) -> T {
    if value > upper {
        upper
    } else if value < lower {
        lower
    } else {
        value
    }
}

impl<T: Sample> Controller<T> {
    /// Creates a controller from gains and the two mandatory callables.
    ///
    /// Everything else starts inert: target, output, and accumulation at
    /// zero, all bounds and wrapping disabled, no time source, and the
    /// controller enabled so the first `tick` computes immediately.
    pub fn new(
        kp: f64,
        ki: f64,
        kd: f64,
        source: impl FnMut() -> T + 'static,
        sink: impl FnMut(T) + 'static,
    ) -> Self {
        Self {
            kp,
            ki,
            kd,
            target: T::zero(),
            output: T::zero(),
            feedback: T::zero(),
            last_feedback: T::zero(),
            error: T::zero(),
            last_error: T::zero(),
            integral: T::zero(),
            max_cumulation: T::from_gain(DEFAULT_INTEGRAL_LIMIT),
            cycle_derivative: T::zero(),
            enabled: true,
            input_bounded: false,
            input_lower: T::zero(),
            input_upper: T::zero(),
            output_bounded: false,
            output_lower: T::zero(),
            output_upper: T::zero(),
            wrapped: false,
            wrap_lower: T::zero(),
            wrap_upper: T::zero(),
            source: Box::new(source),
            sink: Box::new(sink),
            ticks: None,
            last_time: 0,
        }
    }

    /// Runs one control cycle: sample feedback, compute the correction, and
    /// deliver it to the sink.
    ///
    /// Call this at the cadence of the control loop, as fast as the feedback
    /// source is worth sampling. When the controller is disabled this is a
    /// no-op in its entirety: the source is not read, no state changes, and
    /// nothing reaches the sink.
    pub fn tick(&mut self) {
        if !self.enabled {
            return;
        }

        let mut feedback = (self.source)();

        if self.input_bounded {
            feedback = bound(feedback, self.input_lower, self.input_upper);
        }
        self.feedback = feedback;

        self.error = if self.wrapped {
            self.wrapped_error(feedback)
        } else {
            self.target - feedback
        };

        if let Some(ticks) = self.ticks.as_mut() {
            let now = ticks();
            // Unsigned difference. The source must be monotonic; rollover of
            // the underlying counter is the caller's problem.
            let delta = now.wrapping_sub(self.last_time);
            self.last_time = now;

            // Zero elapsed ticks would divide the derivative by zero, so the
            // cycle carries the previous estimates forward unchanged.
            if delta != 0 {
                let dt = delta as f64;
                let cycle_integral =
                    (self.last_error.to_gain() + self.error.to_gain() / 2.0) * dt;
                self.integral = T::from_gain(self.integral.to_gain() + cycle_integral);
                self.cycle_derivative =
                    T::from_gain((self.error.to_gain() - self.last_error.to_gain()) / dt);
            }
        } else {
            // No time source: every cycle counts as one unit of time.
            self.integral = self.integral + self.error;
            self.cycle_derivative = self.error - self.last_error;
        }

        // Anti-windup. Clamped after the new contribution lands, never
        // before, so the accumulator itself can never leave the band.
        if self.integral > self.max_cumulation {
            self.integral = self.max_cumulation;
        } else if self.integral < -self.max_cumulation {
            self.integral = -self.max_cumulation;
        }

        self.output = T::from_gain(
            self.error.to_gain() * self.kp
                + self.integral.to_gain() * self.ki
                + self.cycle_derivative.to_gain() * self.kd,
        );

        // Retain this cycle's samples before output bounding so the clamp
        // can never leak into the next cycle's derivative.
        self.last_feedback = self.feedback;
        self.last_error = self.error;

        if self.output_bounded {
            self.output = bound(self.output, self.output_lower, self.output_upper);
        }

        (self.sink)(self.output);
    }

    /// Computes the error across a circular feedback domain.
    ///
    /// Three paths lead from the feedback to the target: the direct one, and
    /// one across each side of the seam where `wrap_lower` and `wrap_upper`
    /// meet. The path with the smallest magnitude wins, with ties going to
    /// the direct path. A winning low-seam path carries a negative sign, so
    /// wrapping `[0, 360]` with a target of 5 and feedback of 355 yields an
    /// error of -10 rather than 350.
    fn wrapped_error(&self, feedback: T) -> T {
        let direct = self.target - feedback;
        let across_low = (self.target - self.wrap_lower) + (self.wrap_upper - feedback);
        let across_high = (self.wrap_upper - self.target) + (feedback - self.wrap_lower);

        let direct_mag = direct.magnitude();
        let low_mag = across_low.magnitude();
        let high_mag = across_high.magnitude();

        if direct_mag <= low_mag && direct_mag <= high_mag {
            direct
        } else if low_mag <= high_mag {
            -across_low.magnitude()
        } else {
            across_high.magnitude()
        }
    }

    /// Sets the value the controller drives the process variable toward.
    pub fn set_target(&mut self, target: T) {
        self.target = target;
    }

    /// Returns the current target.
    pub fn target(&self) -> T {
        self.target
    }

    /// Returns the last computed correction. The same value is delivered to
    /// the sink on every tick.
    pub fn output(&self) -> T {
        self.output
    }

    /// Returns the last feedback sample, after input bounding.
    pub fn feedback(&self) -> T {
        self.feedback
    }

    /// Returns the feedback sample retained from the cycle before last.
    pub fn last_feedback(&self) -> T {
        self.last_feedback
    }

    /// Returns the last computed error.
    pub fn error(&self) -> T {
        self.error
    }

    /// Enables or disables the controller.
    ///
    /// Disabling an enabled controller zeroes the output and the integral
    /// accumulation, so a later re-enable starts the integral term clean
    /// instead of resuming a stale one. Re-enabling performs no further
    /// reset, and setting the current state again is a no-op.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled && self.enabled {
            self.output = T::zero();
            self.integral = T::zero();
        }
        self.enabled = enabled;
    }

    /// Whether the controller currently computes on tick.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The proportional term's contribution to the last output.
    pub fn proportional_term(&self) -> T {
        T::from_gain(self.error.to_gain() * self.kp)
    }

    /// The integral term's contribution to the last output.
    pub fn integral_term(&self) -> T {
        T::from_gain(self.integral.to_gain() * self.ki)
    }

    /// The derivative term's contribution to the last output.
    pub fn derivative_term(&self) -> T {
        T::from_gain(self.cycle_derivative.to_gain() * self.kd)
    }

    /// Sets the symmetric clamp on the integral accumulation.
    ///
    /// A negative request is flipped positive first. Magnitudes of 1 or less
    /// would make the integral term numerically useless for typical gains,
    /// so they are ignored and the prior limit is retained.
    pub fn set_max_integral_cumulation(&mut self, max: T) {
        let magnitude = max.magnitude();
        if magnitude > T::from_gain(1.0) {
            self.max_cumulation = magnitude;
        }
    }

    /// Returns the integral accumulation clamp.
    pub fn max_integral_cumulation(&self) -> T {
        self.max_cumulation
    }

    /// Returns the current integral accumulation.
    pub fn integral_cumulation(&self) -> T {
        self.integral
    }

    /// Sets bounds that trim every feedback sample before the error is
    /// computed, and enables input bounding. Requests with `lower >= upper`
    /// are ignored.
    pub fn set_input_bounds(&mut self, lower: T, upper: T) {
        if upper > lower {
            self.input_bounded = true;
            self.input_lower = lower;
            self.input_upper = upper;
        }
    }

    /// Enables or disables input bounding; the bound pair is retained.
    pub fn set_input_bounded(&mut self, bounded: bool) {
        self.input_bounded = bounded;
    }

    /// Whether feedback samples are being trimmed.
    pub fn is_input_bounded(&self) -> bool {
        self.input_bounded
    }

    /// Returns the lower input bound.
    pub fn input_lower_bound(&self) -> T {
        self.input_lower
    }

    /// Returns the upper input bound.
    pub fn input_upper_bound(&self) -> T {
        self.input_upper
    }

    /// Sets bounds that trim the final correction just before it reaches
    /// the sink, and enables output bounding. Requests with `lower >= upper`
    /// are ignored.
    pub fn set_output_bounds(&mut self, lower: T, upper: T) {
        if upper > lower {
            self.output_bounded = true;
            self.output_lower = lower;
            self.output_upper = upper;
        }
    }

    /// Enables or disables output bounding; the bound pair is retained.
    pub fn set_output_bounded(&mut self, bounded: bool) {
        self.output_bounded = bounded;
    }

    /// Whether corrections are being trimmed.
    pub fn is_output_bounded(&self) -> bool {
        self.output_bounded
    }

    /// Returns the lower output bound.
    pub fn output_lower_bound(&self) -> T {
        self.output_lower
    }

    /// Returns the upper output bound.
    pub fn output_upper_bound(&self) -> T {
        self.output_upper
    }

    /// Declares the feedback domain circular between `lower` and `upper`,
    /// where both ends name the same physical point (0° and 360°, say), and
    /// enables wrapped error computation.
    ///
    /// Input bounds are forced to the same pair so no sample outside the
    /// circular domain ever reaches the error computation. Requests with
    /// `lower >= upper` are ignored entirely.
    pub fn set_feedback_wrap_bounds(&mut self, lower: T, upper: T) {
        if upper > lower {
            self.set_input_bounds(lower, upper);
            self.wrapped = true;
            self.wrap_lower = lower;
            self.wrap_upper = upper;
        }
    }

    /// Enables or disables wrapped error computation; the wrap pair is
    /// retained.
    pub fn set_feedback_wrapped(&mut self, wrapped: bool) {
        self.wrapped = wrapped;
    }

    /// Whether the feedback domain is treated as circular.
    pub fn is_feedback_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Returns the lower wrap bound.
    pub fn feedback_wrap_lower_bound(&self) -> T {
        self.wrap_lower
    }

    /// Returns the upper wrap bound.
    pub fn feedback_wrap_upper_bound(&self) -> T {
        self.wrap_upper
    }

    /// Sets all three gains at once.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Sets the proportional gain.
    pub fn set_kp(&mut self, kp: f64) {
        self.kp = kp;
    }

    /// Sets the integral gain.
    pub fn set_ki(&mut self, ki: f64) {
        self.ki = ki;
    }

    /// Sets the derivative gain.
    pub fn set_kd(&mut self, kd: f64) {
        self.kd = kd;
    }

    /// Returns the proportional gain.
    pub fn kp(&self) -> f64 {
        self.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> f64 {
        self.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> f64 {
        self.kd
    }

    /// Rebinds the feedback source. Takes effect on the next tick.
    pub fn set_source(&mut self, source: impl FnMut() -> T + 'static) {
        self.source = Box::new(source);
    }

    /// Rebinds the output sink. Takes effect on the next tick.
    pub fn set_sink(&mut self, sink: impl FnMut(T) + 'static) {
        self.sink = Box::new(sink);
    }

    /// Registers a monotonic tick counter, switching integration and
    /// differentiation to time-aware estimates from the next tick on.
    ///
    /// The source is sampled once here to seed the delta baseline, so the
    /// first time-aware cycle sees only the time elapsed since
    /// registration. There is no way to unregister a source.
    pub fn register_tick_source(&mut self, ticks: impl FnMut() -> u64 + 'static) {
        let mut ticks = Box::new(ticks);
        self.last_time = ticks();
        self.ticks = Some(ticks);
    }
}

/// Builds a [`Controller`] from a full configuration in one expression,
/// reporting invalid requests through [`ConfigError`] instead of silently
/// dropping them the way the runtime setters do.
///
/// Wrap bounds, when given, force the input bounds to the same pair and
/// take precedence over an `input_bounds` call.
///
/// ```
/// use pidloop::controller::ControllerBuilder;
///
/// let mut pid = ControllerBuilder::default()
///     .gains(1.0, 0.1, 0.0)
///     .target(180.0)
///     .feedback_wrap_bounds(0.0, 360.0)
///     .output_bounds(-1.0, 1.0)
///     .build(|| 90.0, |_command| ())
///     .expect("valid controller config");
///
/// pid.tick();
/// assert_eq!(pid.error(), 90.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ControllerBuilder<T: Sample> {
    kp: f64,
    ki: f64,
    kd: f64,
    target: T,
    max_cumulation: Option<T>,
    input_bounds: Option<(T, T)>,
    output_bounds: Option<(T, T)>,
    wrap_bounds: Option<(T, T)>,
    enabled: bool,
}

impl<T: Sample> Default for ControllerBuilder<T> {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            target: T::zero(),
            max_cumulation: None,
            input_bounds: None,
            output_bounds: None,
            wrap_bounds: None,
            enabled: true,
        }
    }
}

impl<T: Sample> ControllerBuilder<T> {
    /// Sets all three gains.
    pub fn gains(mut self, kp: f64, ki: f64, kd: f64) -> Self {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self
    }

    /// Sets the initial target.
    pub fn target(mut self, target: T) -> Self {
        self.target = target;
        self
    }

    /// Sets the symmetric integral accumulation clamp.
    pub fn max_integral_cumulation(mut self, max: T) -> Self {
        self.max_cumulation = Some(max);
        self
    }

    /// Sets and enables input bounds.
    pub fn input_bounds(mut self, lower: T, upper: T) -> Self {
        self.input_bounds = Some((lower, upper));
        self
    }

    /// Sets and enables output bounds.
    pub fn output_bounds(mut self, lower: T, upper: T) -> Self {
        self.output_bounds = Some((lower, upper));
        self
    }

    /// Sets and enables feedback wrapping; also forces input bounds to the
    /// same pair.
    pub fn feedback_wrap_bounds(mut self, lower: T, upper: T) -> Self {
        self.wrap_bounds = Some((lower, upper));
        self
    }

    /// Sets whether the controller starts enabled. Defaults to true.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Validates the configuration and produces a controller bound to the
    /// given source and sink.
    pub fn build(
        self,
        source: impl FnMut() -> T + 'static,
        sink: impl FnMut(T) + 'static,
    ) -> Result<Controller<T>, ConfigError> {
        if let Some((lower, upper)) = self.input_bounds {
            if upper <= lower {
                return Err(ConfigError::InvalidInputBounds);
            }
        }
        if let Some((lower, upper)) = self.output_bounds {
            if upper <= lower {
                return Err(ConfigError::InvalidOutputBounds);
            }
        }
        if let Some((lower, upper)) = self.wrap_bounds {
            if upper <= lower {
                return Err(ConfigError::InvalidWrapBounds);
            }
        }
        if let Some(max) = self.max_cumulation {
            if !(max.magnitude() > T::from_gain(1.0)) {
                return Err(ConfigError::InvalidIntegralLimit);
            }
        }

        let mut controller = Controller::new(self.kp, self.ki, self.kd, source, sink);
        controller.set_target(self.target);
        if let Some((lower, upper)) = self.input_bounds {
            controller.set_input_bounds(lower, upper);
        }
        if let Some((lower, upper)) = self.output_bounds {
            controller.set_output_bounds(lower, upper);
        }
        if let Some((lower, upper)) = self.wrap_bounds {
            controller.set_feedback_wrap_bounds(lower, upper);
        }
        if let Some(max) = self.max_cumulation {
            controller.set_max_integral_cumulation(max);
        }
        controller.set_enabled(self.enabled);
        Ok(controller)
    }
}
