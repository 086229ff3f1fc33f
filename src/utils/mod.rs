pub mod ip;

pub use ip::extract_client_ip;
