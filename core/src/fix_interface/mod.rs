pub mod clock;
pub mod fix;
pub mod source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fix::{parse_fix_batch, Fix};
pub use source::{FixSource, PassiveSource};
