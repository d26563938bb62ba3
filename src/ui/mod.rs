pub mod gating;

pub use gating::RestrictedActionGate;
