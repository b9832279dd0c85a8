pub mod artifact;
pub mod droid;
pub mod orchestrator;
pub mod session;
pub mod surface;

pub use artifact::*;
pub use droid::*;
pub use orchestrator::*;
pub use session::*;
pub use surface::*;
