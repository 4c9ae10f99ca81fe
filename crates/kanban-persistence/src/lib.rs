pub mod prefs;
pub mod rows;
pub mod store;
pub mod traits;

pub use prefs::LocalPrefs;
pub use rows::*;
pub use store::*;
pub use traits::*;
