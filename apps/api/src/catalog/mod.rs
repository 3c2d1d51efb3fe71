//! Course catalog and enrollment bookkeeping.

pub mod courses;
pub mod enrollment;
pub mod handlers;
pub mod repository;
