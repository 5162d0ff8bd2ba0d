pub mod channel;
pub mod drivers;
pub mod pool;
pub mod report;
pub mod sched;
pub mod stats;
