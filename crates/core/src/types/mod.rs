//! Core domain types.

pub mod email;
pub mod id;
pub mod slug;
