/// Middleware modules for the API server
///
/// - `security`: Security response headers
/// - `upload`: Multipart photo upload extraction and storage
///
/// Session authentication lives next to the router in `app`.

pub mod security;
pub mod upload;
