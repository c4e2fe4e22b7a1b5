//! Data models for reply references

pub mod configuration;
pub mod content;
pub mod ids;
pub mod origin;
pub mod text;

pub use configuration::*;
pub use content::*;
pub use ids::*;
pub use origin::*;
pub use text::*;
