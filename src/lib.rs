#![warn(
    future_incompatible,
    rust_2018_idioms,
    unused,
    trivial_casts,
    trivial_numeric_casts,
    unused_lifetimes,
    unused_qualifications,
    clippy::cargo,
    clippy::redundant_pub_crate,
    clippy::use_self,
    clippy::suspicious_operation_groupings,
    clippy::wildcard_imports
)]
#![doc = include_str!("../README.md")]

pub mod engine;
mod group;
mod runnable;

pub use engine::{
    AlwaysSpawnTaskSystem, SerialTaskSystem, SleepingThreadPool, SpinningThreadPool, TaskSystem,
};
pub use group::TaskGroupId;
pub use runnable::Runnable;

pub mod prelude {
    pub use crate::{Runnable, SleepingThreadPool, TaskGroupId, TaskSystem};
}
