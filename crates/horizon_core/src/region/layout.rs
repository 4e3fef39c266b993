//! Fixed region layout, in float-element (4-byte word) offsets.
//!
//! ```text
//!    0 ┌──────────────┐ CONTROL    (16 words, render side writes deltas)
//!   64 ├──────────────┤ CAMERA     (64 words, 16 published)
//!  128 ├──────────────┤ PHYSICS    (128 words, 64 published)
//!  256 ├──────────────┤ TELEMETRY  (sequence counter + counters)
//!      │   unused     │
//! 2048 ├──────────────┤ LUT        (256 temperatures + 256 × RGB)
//! 3072 └──────────────┘
//! ```
//!
//! These offsets are a contract with any counterpart process sharing the
//! buffer and must not move.

/// CONTROL segment offset.
pub const CONTROL_OFFSET: usize = 0;
/// CONTROL segment length.
pub const CONTROL_LEN: usize = 16;

/// CAMERA segment offset.
pub const CAMERA_OFFSET: usize = 64;
/// CAMERA segment capacity.
pub const CAMERA_LEN: usize = 64;
/// Words of CAMERA actually published.
pub const CAMERA_FLOATS: usize = 16;

/// PHYSICS segment offset.
pub const PHYSICS_OFFSET: usize = 128;
/// PHYSICS segment capacity.
pub const PHYSICS_LEN: usize = 128;
/// Words of PHYSICS actually published.
pub const PHYSICS_FLOATS: usize = 64;

/// TELEMETRY segment offset.
pub const TELEMETRY_OFFSET: usize = 256;
/// TELEMETRY segment length.
pub const TELEMETRY_LEN: usize = 16;

/// LUT storage offset.
pub const LUT_OFFSET: usize = 2048;
/// Number of radial LUT samples.
pub const LUT_SAMPLES: usize = 256;
/// LUT storage length: temperatures followed by RGB triples.
pub const LUT_LEN: usize = LUT_SAMPLES * 4;

/// Total region length in words.
pub const REGION_LEN: usize = LUT_OFFSET + LUT_LEN;
/// Total region size in bytes.
pub const REGION_BYTES: usize = REGION_LEN * 4;

/// Word indices inside CONTROL.
pub mod control {
    /// Latest render frame interval, seconds. Render side writes.
    pub const FRAME_DT: usize = 0;
    /// Pending azimuth delta, radians. Render side accumulates, stepper drains.
    pub const ORBIT_THETA: usize = 1;
    /// Pending polar delta, radians. Render side accumulates, stepper drains.
    pub const ORBIT_PHI: usize = 2;
    /// Pending zoom delta (fraction of distance). Render side accumulates, stepper drains.
    pub const ZOOM: usize = 3;
    /// Applied mass mirror. Stepper writes.
    pub const MASS: usize = 4;
    /// Applied spin mirror. Stepper writes.
    pub const SPIN: usize = 5;
    /// Applied configuration generation (integer word). Stepper writes.
    pub const CONFIG_GENERATION: usize = 6;
    /// Input generation (integer word), bumped on every input. Render side writes.
    pub const INPUT_GENERATION: usize = 7;
}

/// Word indices inside TELEMETRY. All are integer words.
pub mod telemetry {
    /// Publication sequence counter.
    pub const SEQUENCE: usize = 0;
    /// Completed stepper ticks.
    pub const TICK_COUNT: usize = 1;
    /// Ticks that overran their budget.
    pub const LATE_TICKS: usize = 2;
    /// Duration of the most recent tick, microseconds.
    pub const LAST_TICK_MICROS: usize = 3;
    /// 1 while the stepper is idle-throttled.
    pub const IDLE: usize = 4;
    /// Generation of the LUT contents.
    pub const LUT_GENERATION: usize = 5;
    /// 1 while the stepper loop is alive.
    pub const ALIVE: usize = 6;
}

const _: () = assert!(CONTROL_OFFSET + CONTROL_LEN <= CAMERA_OFFSET);
const _: () = assert!(CAMERA_OFFSET + CAMERA_LEN <= PHYSICS_OFFSET);
const _: () = assert!(PHYSICS_OFFSET + PHYSICS_LEN <= TELEMETRY_OFFSET);
const _: () = assert!(TELEMETRY_OFFSET + TELEMETRY_LEN <= LUT_OFFSET);
const _: () = assert!(CAMERA_FLOATS <= CAMERA_LEN && PHYSICS_FLOATS <= PHYSICS_LEN);
