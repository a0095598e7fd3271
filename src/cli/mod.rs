//! Terminal presentation shared by the `ayur` binary.

pub mod render;
