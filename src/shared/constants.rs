/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum photos accepted on a single report submission
pub const MAX_REPORT_PHOTOS: usize = 5;

/// Maximum size of a single uploaded photo in bytes (10 MB)
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;
