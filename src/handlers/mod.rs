pub mod health_handlers;
pub mod qube_handlers;
pub mod zone_handlers;
