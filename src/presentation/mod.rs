pub mod http_handlers;
pub mod images;
