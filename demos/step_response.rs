//! Closed-loop step tracking of a first-order lag plant, printed as CSV.
//! Requires the `--features simulation` flag.

use core::cell::Cell;
use std::rc::Rc;

use pidloop::controller::Controller;
use pidloop::sim::{FirstOrderLag, SignalGenerator, WaveForm};

const TICKS_PER_STEP: u64 = 10; // milliseconds
const FIXED_STEP_SIZE_S: f64 = TICKS_PER_STEP as f64 * 0.001;

fn main() {
    let reading = Rc::new(Cell::new(0.0_f64));
    let command = Rc::new(Cell::new(0.0_f64));
    let now = Rc::new(Cell::new(0_u64));

    let mut pid = Controller::new(
        1.0,
        0.0005,
        0.0,
        {
            let reading = Rc::clone(&reading);
            move || reading.get()
        },
        {
            let command = Rc::clone(&command);
            move |u| command.set(u)
        },
    );
    pid.set_output_bounds(-5.0, 5.0);
    pid.register_tick_source({
        let now = Rc::clone(&now);
        move || now.get()
    });

    // A slow square wave toggling the setpoint between 0 and 1.
    let setpoint = SignalGenerator::new(WaveForm::Square, 5000.0, 0.5, 0.5);
    let mut plant = FirstOrderLag::new(1.0, 0.2);

    println!("time_s,setpoint,measured,control");
    for step in 0..6000_u64 {
        now.set(step * TICKS_PER_STEP);

        pid.set_target(setpoint.generate(now.get()));
        reading.set(plant.measure());
        pid.tick();

        plant.step(command.get(), FIXED_STEP_SIZE_S);

        if step % 10 == 0 {
            println!(
                "{:.2},{:.3},{:.4},{:.4}",
                step as f64 * FIXED_STEP_SIZE_S,
                pid.target(),
                plant.measure(),
                command.get()
            );
        }
    }
}
