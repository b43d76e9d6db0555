use nalgebra as na;

/// Waveforms the signal generator can produce.
pub enum WaveForm {
    /// A sine of unit angular frequency.
    Sine,
    /// A square wave derived from the sign of the sine.
    Square,
}

/// Generates setpoint profiles over a tick-counter timeline.
pub struct SignalGenerator {
    fcn: fn(f64) -> f64,
    ticks_per_second: f64,
    amplitude: f64,
    offset: f64,
}

impl SignalGenerator {
    /// Creates a generator that interprets tick counts at the given
    /// resolution.
    pub fn new(waveform: WaveForm, ticks_per_second: f64, amplitude: f64, offset: f64) -> Self {
        Self {
            fcn: match waveform {
                WaveForm::Sine => f64::sin,
                WaveForm::Square => |x| x.sin().signum(),
            },
            ticks_per_second,
            amplitude,
            offset,
        }
    }

    /// Evaluates the signal at the given tick count.
    pub fn generate(&self, tick: u64) -> f64 {
        self.amplitude * (self.fcn)(tick as f64 / self.ticks_per_second) + self.offset
    }
}

/// A first-order lag plant, τ·y' + y = K·u, stepped with forward Euler.
pub struct FirstOrderLag {
    /// Steady-state gain K.
    pub gain: f64,
    /// Time constant τ in seconds.
    pub time_constant: f64,
    state: f64,
}

impl FirstOrderLag {
    /// Creates the plant at rest.
    pub fn new(gain: f64, time_constant: f64) -> Self {
        Self {
            gain,
            time_constant,
            state: 0.0,
        }
    }

    /// Advances the plant by `dt` seconds under the control input `u` and
    /// returns the new measurement.
    pub fn step(&mut self, u: f64, dt: f64) -> f64 {
        self.state += dt * (self.gain * u - self.state) / self.time_constant;
        self.state
    }

    /// Returns the current measurement.
    pub fn measure(&self) -> f64 {
        self.state
    }
}

/// A heading servo whose measurement lives on the circle [0, 360).
pub struct HeadingServo {
    /// Turn acceleration per unit of control input, in °/s² per unit.
    pub turn_rate_gain: f64,
    /// Viscous damping on the turn rate, in 1/s.
    pub damping: f64,
}

impl HeadingServo {
    /// Implements the state-space realization of the servo:
    /// ┌    ┐   ┌       ┐┌    ┐   ┌   ┐
    /// │ h' │ = │ 0   1 ││ h  │ + │ 0 │ u
    /// │ r' │   │ 0  -d ││ r  │   │ g │
    /// └    ┘   └       ┘└    ┘   └   ┘
    pub fn f(&self, x: na::Vector2<f64>, u: f64) -> na::Vector2<f64> {
        let mat_a = na::Matrix2::new(0.0, 1.0, 0.0, -self.damping);
        let mat_b = na::Vector2::new(0.0, self.turn_rate_gain);

        mat_a * x + mat_b * u
    }

    /// Measures the heading, folded into [0, 360).
    pub fn h(&self, x: na::Vector2<f64>) -> f64 {
        x[0].rem_euclid(360.0)
    }
}
