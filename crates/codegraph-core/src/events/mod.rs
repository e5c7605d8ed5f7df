//! Progress/audit event plumbing, mirroring `drift_core::events`: a handler
//! trait consumers implement, plus typed event payloads. Used by the AST
//! Projector and orchestrator to report progress without coupling to a
//! specific logging or metrics backend.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::CodeGraphEventHandler;
