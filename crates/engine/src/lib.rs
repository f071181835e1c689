//! SagaForge Engine library.
//!
//! Orchestrates the pure progression pipeline from `sagaforge-domain`
//! around persistence, locking and logging.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration (apply, preview, rebuild, create, sheet)
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
