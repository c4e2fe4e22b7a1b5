//! Ambient services shared by the reply components

pub mod logging;
