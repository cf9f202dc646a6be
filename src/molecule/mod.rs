pub use bond::*;
pub use frame::*;
pub use reader::*;

pub mod bond;
pub mod frame;
pub mod reader;
