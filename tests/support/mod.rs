#![allow(dead_code)]

pub mod provider;
pub mod socket_guard;
