pub mod record_codec;
pub mod task_file;

pub use record_codec::{DecodeError, HEADER, decode_record, encode_record, split_fields};
pub use task_file::{DroppedRecord, parse_task_file, serialize_task_file};
