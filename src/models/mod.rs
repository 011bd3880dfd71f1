pub mod analysis;
pub mod enums;
pub mod facility;

pub use analysis::*;
pub use enums::*;
pub use facility::*;
