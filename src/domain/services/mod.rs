pub mod check_digit;
pub mod correction;
pub mod detector;
pub mod frame_gate;
pub mod line_assembly;
pub mod parser;
pub mod region;
pub mod session;
pub mod stabilizer;

pub use detector::{Detection, MrzDetector};
pub use frame_gate::{FrameGate, FramePermit};
pub use session::ScanSession;
pub use stabilizer::{Stabilizer, StabilizerVerdict};
