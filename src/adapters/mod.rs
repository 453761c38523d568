pub mod api_handler;
pub mod health_handler;
pub mod http_record_client;
pub mod memory_records;
