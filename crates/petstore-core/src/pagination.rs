//! Page requests and paginated results for list queries.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sort order as requested by the client (`field,asc` / `field,desc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: Direction,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            property: "id".into(),
            direction: Direction::Asc,
        }
    }
}

impl Sort {
    /// Parse `property[,direction]`. Unknown directions fall back to ascending.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(',').map(str::trim);
        let property = match parts.next() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => return Self::default(),
        };
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("desc") => Direction::Desc,
            _ => Direction::Asc,
        };
        Self {
            property,
            direction,
        }
    }

    /// Render back into the `property,direction` query form.
    pub fn to_query(&self) -> String {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        format!("{},{dir}", self.property)
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Sort::default(),
        }
    }
}

impl PageRequest {
    /// Build a request from raw query values, substituting defaults for
    /// anything missing or unparsable. A size of zero is treated as the
    /// default and sizes are capped at [`MAX_PAGE_SIZE`].
    pub fn from_query(page: Option<&str>, size: Option<&str>, sort: Option<&str>) -> Self {
        let page = page.and_then(|p| p.trim().parse().ok()).unwrap_or(0);
        let size = size
            .and_then(|s| s.trim().parse().ok())
            .filter(|s: &u64| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let sort = sort.map(Sort::parse).unwrap_or_default();
        Self { page, size, sort }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

/// A page of results plus the total number of matching records.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}

impl<T> Page<T> {
    /// Index of the last page (zero when there are no results).
    pub fn last_page(&self) -> u64 {
        if self.total == 0 || self.size == 0 {
            0
        } else {
            (self.total - 1) / self.size
        }
    }
}
