pub mod daily;
pub mod paginate;
pub mod summary;
pub mod transfer;
