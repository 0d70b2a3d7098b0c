//! Runtime entity model.
//!
//! Static schema tables that stand in for runtime reflection: each entity
//! type declares one `EntityModel` listing its fields, their declared kinds
//! and their mapping roles. Everything that needs to know the shape of an
//! entity reads it from here.
pub mod entity;
pub mod field;
pub mod index;
