//! Observability helpers layered on top of `tracing-actix-web`.

mod request_id;

pub use request_id::echo_request_id;
