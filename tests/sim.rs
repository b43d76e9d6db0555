
#[cfg(feature = "simulation")]
mod test_closed_loop_behavior {

    use core::cell::Cell;
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use nalgebra as na;

    use pidloop::controller::ControllerBuilder;
    use pidloop::sim::{FirstOrderLag, HeadingServo};

    use super::fixtures::harness::make_controller;

    const FIXED_STEP_SIZE_S: f64 = 0.01;

    /// Drives a first-order lag plant to a constant setpoint with PI control
    /// and unit-time integration. The plant settles on the setpoint, which a
    /// pure proportional loop could not do on a unity-gain lag.
    #[test]
    fn test_pi_control_settles_first_order_lag() {
        let (mut pid, io) = make_controller::<f64>(1.0, 0.005, 0.0);
        pid.set_target(1.0);
        pid.set_output_bounds(-5.0, 5.0);

        let mut plant = FirstOrderLag::new(1.0, 0.2);

        for _ in 0..5000 {
            io.feedback.set(plant.measure());
            pid.tick();

            let control = io.delivered.get().expect("sink received a correction");
            assert!((-5.0..=5.0).contains(&control));

            plant.step(control, FIXED_STEP_SIZE_S);
        }

        assert_relative_eq!(plant.measure(), 1.0, epsilon = 0.02);
    }

    /// Pure proportional control of the same plant stalls below the
    /// setpoint; the integral term is what closes the steady-state gap.
    #[test]
    fn test_p_only_control_leaves_steady_state_offset() {
        let (mut pid, io) = make_controller::<f64>(1.0, 0.0, 0.0);
        pid.set_target(1.0);

        let mut plant = FirstOrderLag::new(1.0, 0.2);

        for _ in 0..5000 {
            io.feedback.set(plant.measure());
            pid.tick();
            plant.step(io.delivered.get().unwrap_or(0.0), FIXED_STEP_SIZE_S);
        }

        // Unity gain and kp = 1 settle at half the setpoint.
        assert_relative_eq!(plant.measure(), 0.5, epsilon = 0.02);
    }

    /// Holds a heading servo on a setpoint through the wrapped error path.
    /// The controller is built with wrap bounds, so the error it reports is
    /// always the short arc.
    #[test]
    fn test_heading_hold_converges_under_wrap() {
        let command = Rc::new(Cell::new(0.0_f64));
        let measured = Rc::new(Cell::new(50.0_f64));

        let mut pid = ControllerBuilder::default()
            .gains(0.25, 0.0, 0.0)
            .target(90.0)
            .feedback_wrap_bounds(0.0, 360.0)
            .build(
                {
                    let measured = Rc::clone(&measured);
                    move || measured.get()
                },
                {
                    let command = Rc::clone(&command);
                    move |u| command.set(u)
                },
            )
            .expect("valid controller config");

        let servo = HeadingServo {
            turn_rate_gain: 1.0,
            damping: 2.0,
        };

        let mut state = na::vector![50.0, 0.0];
        for _ in 0..8000 {
            measured.set(servo.h(state));
            pid.tick();

            state += servo.f(state, command.get()) * FIXED_STEP_SIZE_S;
        }

        assert_relative_eq!(servo.h(state), 90.0, epsilon = 1.0);
        // On the settled short arc the wrapped error equals the naive one.
        assert_relative_eq!(pid.error(), 90.0 - servo.h(state), epsilon = 1.0);
    }
}
