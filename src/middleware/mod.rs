pub mod cors;
pub mod signature;

pub use cors::create_cors_layer;
pub use signature::verify_queue_signature;
