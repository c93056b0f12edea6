//! Force models driven by resolved density
//!
//! Only drag is provided; summing contributions into a total acceleration
//! belongs to the host propagator.

mod drag;

pub use drag::{drag_acceleration, AtmosphericDrag, DragAcceleration, DragState};
