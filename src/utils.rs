//! Small numeric helpers shared by the pointer backends and the control loop.

pub mod safe_cast;
