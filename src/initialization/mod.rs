pub use io::*;
pub use system::*;

pub mod io;
pub mod system;
