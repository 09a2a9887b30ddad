//! Fingerabdrucksensor: Paketformat, Befehle und Anlernen

pub mod enroll;
pub mod packet;
pub mod reader;

pub use enroll::{EnrollFailure, EnrollPhase, EnrollProgress, EnrollPrompt, EnrollSession};
pub use packet::{Command, Reply};
pub use reader::{FingerprintReader, ScanOutcome};
