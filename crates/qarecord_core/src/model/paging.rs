//! Paging request/result shapes for list queries.

use serde::{Deserialize, Serialize};

/// Filter plus 1-based page window for record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingRequest {
    pub app_id: i64,
    /// 1-based page number.
    pub page_no: u32,
    pub page_size: u32,
}

impl PagingRequest {
    pub fn new(app_id: i64, page_no: u32, page_size: u32) -> Self {
        Self {
            app_id,
            page_no,
            page_size,
        }
    }

    /// Checks `page_no >= 1` and `page_size >= 1`.
    pub fn validate(&self) -> Result<(), String> {
        if self.page_no == 0 {
            return Err("page_no must be >= 1".to_string());
        }
        if self.page_size == 0 {
            return Err("page_size must be >= 1".to_string());
        }
        Ok(())
    }

    /// Row offset of the first record on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_no.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Total matching count plus the records of one page.
///
/// # Invariants
/// - `list.len() <= page_size` of the originating request.
/// - `total >= list.len()` unless rows were inserted between count and fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub list: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            list: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PagingRequest;

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PagingRequest::new(1, 1, 20).offset(), 0);
        assert_eq!(PagingRequest::new(1, 3, 20).offset(), 40);
    }

    #[test]
    fn offset_does_not_overflow_u32() {
        let request = PagingRequest::new(1, u32::MAX, u32::MAX);
        assert_eq!(
            request.offset(),
            u64::from(u32::MAX - 1) * u64::from(u32::MAX)
        );
    }

    #[test]
    fn validate_rejects_zero_page_or_size() {
        assert!(PagingRequest::new(1, 0, 10).validate().is_err());
        assert!(PagingRequest::new(1, 1, 0).validate().is_err());
        assert!(PagingRequest::new(1, 1, 1).validate().is_ok());
    }
}
