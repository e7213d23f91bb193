pub mod contributor;
pub mod driver;
pub mod field;
pub mod lifecycle;
pub mod state;
pub mod trail;
pub mod volume;

pub use contributor::{Contributor, ContributorBatch, IsoSurface};
pub use driver::{AnimationDriver, FrameOutcome, TickReport};
pub use state::SimulationState;
pub use trail::unproject_pointer;
