pub mod deal;
pub mod reference;
pub mod snapshot;
pub mod stage;

pub use deal::{Deal, StageRef};
pub use reference::{AccountRef, PersonRef};
pub use snapshot::{BoardData, BoardSnapshot};
pub use stage::{Stage, StageCatalog};
