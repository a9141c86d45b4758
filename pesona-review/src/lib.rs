pub mod gate;

pub use gate::ReviewGate;
