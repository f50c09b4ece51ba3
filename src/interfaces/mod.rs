//! Outer surfaces that drive the hall.

pub mod csv;
