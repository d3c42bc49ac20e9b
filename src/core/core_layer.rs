// The core module contains all business logic.
// Each feature gets its own submodule. Nothing in here performs I/O directly;
// it talks to the outside world only through traits implemented in infra.

#[path = "auth/mod.rs"]
pub mod auth;

#[path = "curriculum/mod.rs"]
pub mod curriculum;

#[path = "publishing/mod.rs"]
pub mod publishing;

#[path = "resume/mod.rs"]
pub mod resume;
