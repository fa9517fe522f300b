use serde::Serialize;

/// Plain success envelope wrapping a single payload.
#[derive(Debug, Serialize)]
pub struct DataResp<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResp<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResp {
    pub success: bool,
    pub message: String,
}

impl MessageResp {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub current: u64,
    pub total: u64,
    pub limit: u64,
}

/// Paginated list envelope. `count` is the number of items on this page,
/// `total` the number of matching rows, `pagination.total` the page count.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub success: bool,
    pub count: usize,
    pub total: u64,
    pub pagination: PageMeta,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            success: true,
            count: data.len(),
            total,
            pagination: PageMeta {
                current: page,
                total: pages,
                limit,
            },
            data,
        }
    }
}
