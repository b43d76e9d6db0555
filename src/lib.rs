#![warn(missing_docs)]

//! # Closed-Loop PID Controller Library
//!
//! This library provides a generic closed-loop PID (Proportional-Integral-Derivative)
//! controller that owns its feedback source and output sink as injected callables and
//! is driven by a caller-owned periodic [`tick`](controller::Controller::tick).
//!
//! ## Features
//!
//! - One hot-path operation: `tick()` samples feedback, computes the correction, and
//!   delivers it to the sink, with no return channel and no allocation.
//! - Wrap-around error computation for circular domains such as compass headings,
//!   always driving along the shorter arc.
//! - Time-aware integration and differentiation when a monotonic tick counter is
//!   registered; unit-time estimates otherwise.
//! - Anti-windup: the integral accumulation is clamped symmetrically every cycle.
//! - Independent input bounding (sensor validity) and output bounding (actuator
//!   safety).
//! - Generic over the sample representation: `i32`, `i64`, `f32`, and `f64` out of
//!   the box.
//!
//! ## Usage
//!
//! The controller reads feedback and writes corrections through callables handed to
//! it at construction, so a control loop reduces to calling `tick` at a fixed
//! cadence:
//!
//! ```rust
//! use core::cell::Cell;
//! use std::rc::Rc;
//!
//! use pidloop::controller::Controller;
//!
//! let reading = Rc::new(Cell::new(0.0_f64));
//! let command = Rc::new(Cell::new(0.0_f64));
//!
//! let source = {
//!     let reading = Rc::clone(&reading);
//!     move || reading.get()
//! };
//! let sink = {
//!     let command = Rc::clone(&command);
//!     move |correction| command.set(correction)
//! };
//!
//! let mut pid = Controller::new(2.0, 0.0, 0.0, source, sink);
//! pid.set_target(10.0);
//!
//! pid.tick();
//! assert_eq!(command.get(), 20.0);
//!
//! reading.set(5.0);
//! pid.tick();
//! assert_eq!(command.get(), 10.0);
//! ```
//!
//! ### Building a fully configured controller
//!
//! [`ControllerBuilder`](controller::ControllerBuilder) validates bounds and wrap
//! configuration up front instead of silently ignoring bad requests the way the
//! runtime setters do:
//!
//! ```rust
//! use pidloop::controller::ControllerBuilder;
//!
//! let mut heading_pid = ControllerBuilder::default()
//!     .gains(0.5, 0.01, 0.1)
//!     .target(90.0)
//!     .feedback_wrap_bounds(0.0, 360.0)
//!     .output_bounds(-1.0, 1.0)
//!     .build(|| 50.0, |_rudder| ())
//!     .expect("valid controller config");
//!
//! heading_pid.tick();
//! assert_eq!(heading_pid.error(), 40.0);
//! ```
//!
//! ### Registering a time source
//!
//! Without a time source every cycle counts as one unit of time. Registering a
//! monotonic tick counter switches the integral to a trapezoidal estimate over the
//! elapsed ticks and the derivative to a difference quotient:
//!
//! ```rust
//! use pidloop::controller::Controller;
//! use pidloop::time::SystemMillis;
//!
//! let mut pid = Controller::new(1.0, 0.1, 0.0, || 0.0_f64, |_u| ());
//! let clock = SystemMillis::now();
//! pid.register_tick_source(move || clock.ticks());
//! ```
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// The controller itself: the per-cycle algorithm and the configuration surface.
pub mod controller;

/// The numeric abstraction the controller is generic over.
pub mod num;

/// The module containing tick-source utilities for time-aware control.
pub mod time;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
