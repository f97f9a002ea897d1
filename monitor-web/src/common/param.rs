use serde::{Deserialize, Serialize};

use crate::error::AppError;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 200;
const MAX_OFFSET: u64 = i64::MAX as u64;

/// 1-based page request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    page: u64,
    size: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    /// Returns `(page, size)` with page starting at 1 and size clamped to `1..=200`.
    /// A page whose row offset does not fit a signed 64-bit SQL offset is rejected.
    pub fn init(&self) -> Result<(u64, u64), AppError> {
        let page = self.page.max(1);
        let size = self.size.clamp(1, MAX_PAGE_SIZE);
        (page - 1)
            .checked_mul(size)
            .filter(|offset| *offset <= MAX_OFFSET)
            .ok_or_else(|| AppError::MsgError(format!("page {page} out of range")))?;
        Ok((page, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_clamps() {
        assert_eq!(PageQuery::new(0, 0).init().unwrap(), (1, 1));
        assert_eq!(PageQuery::new(3, 1000).init().unwrap(), (3, 200));
        assert_eq!(PageQuery::default().init().unwrap(), (1, 20));
    }

    #[test]
    fn init_rejects_offset_overflow() {
        let err = PageQuery::new(u64::MAX, 200).init().unwrap_err();
        assert!(matches!(err, AppError::MsgError(ref m) if m.contains("out of range")));
        assert!(PageQuery::new(u64::MAX, 1).init().is_err());
        assert!(PageQuery::new(MAX_OFFSET + 1, 1).init().is_ok());
        let last = MAX_OFFSET / 200 + 1;
        assert!(PageQuery::new(last, 200).init().is_ok());
        assert!(PageQuery::new(last + 1, 200).init().is_err());
    }
}
