pub mod backend;
pub mod config_io;
pub mod file_backend;
pub mod host;
pub mod kv_backend;
pub mod lock;
pub mod recovery;
pub mod state;
pub mod storage;
