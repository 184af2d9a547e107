pub mod job;
pub mod profile;

pub use job::{Job, PosterKind, SalaryPeriod};
pub use profile::{Profile, Role};
