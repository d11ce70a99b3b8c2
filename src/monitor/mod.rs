pub mod detector;
pub mod levels;
pub mod scheduler;
pub mod session;
