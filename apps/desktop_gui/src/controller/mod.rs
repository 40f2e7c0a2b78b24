//! Controller layer: worker events, state reduction, and command dispatch.

pub mod events;
pub mod orchestration;
pub mod reducer;
