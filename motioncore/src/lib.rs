#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod accumulator;
pub mod feedback;
pub mod pose;
pub mod profile;
pub mod slalom;
pub mod state;
pub mod straight;
pub mod tracker;
pub mod trajectory;
mod utils;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SideData<T> {
    pub left: T,
    pub right: T,
}
