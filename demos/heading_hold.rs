//! Heading hold on a circular feedback domain: the controller wraps the
//! error across the 0°/360° seam, so it always reports the short arc.
//! Requires the `--features simulation` flag.

use core::cell::Cell;
use std::rc::Rc;

use nalgebra as na;

use pidloop::controller::ControllerBuilder;
use pidloop::sim::HeadingServo;

const FIXED_STEP_SIZE_S: f64 = 0.01;

fn main() {
    let measured = Rc::new(Cell::new(50.0_f64));
    let rudder = Rc::new(Cell::new(0.0_f64));

    let mut pid = ControllerBuilder::default()
        .gains(0.25, 0.0, 0.0)
        .target(90.0)
        .feedback_wrap_bounds(0.0, 360.0)
        .output_bounds(-30.0, 30.0)
        .build(
            {
                let measured = Rc::clone(&measured);
                move || measured.get()
            },
            {
                let rudder = Rc::clone(&rudder);
                move |u| rudder.set(u)
            },
        )
        .expect("valid controller config");

    let servo = HeadingServo {
        turn_rate_gain: 1.0,
        damping: 2.0,
    };

    let mut state = na::vector![50.0, 0.0];

    println!("time_s,heading_deg,error_deg,rudder");
    for step in 0..8000_u64 {
        measured.set(servo.h(state));
        pid.tick();

        state += servo.f(state, rudder.get()) * FIXED_STEP_SIZE_S;

        if step % 50 == 0 {
            println!(
                "{:.2},{:.2},{:.2},{:.3}",
                step as f64 * FIXED_STEP_SIZE_S,
                servo.h(state),
                pid.error(),
                rudder.get()
            );
        }
    }
}
