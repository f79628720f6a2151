use crate::models::{Page, Pagination};

/// Page sizes applied when a request does not carry a usable `limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    pub search_limit: u32,
    pub list_limit: u32,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            search_limit: 10,
            list_limit: 20,
        }
    }
}

/// A validated page/limit pair, both at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Coerces raw query-string values, falling back to page 1 and
    /// `default_limit` for anything that is not a positive integer.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, default_limit: u32) -> Self {
        Self {
            page: coerce_positive(page).unwrap_or(1),
            limit: coerce_positive(limit).unwrap_or(default_limit.max(1)),
        }
    }

    /// Lifts a hand-built zero page or limit back to 1
    fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.max(1),
        }
    }

    pub fn skip(&self) -> u64 {
        let request = self.normalized();
        u64::from(request.page - 1) * u64::from(request.limit)
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        let request = self.normalized();
        Pagination {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(u64::from(request.limit)),
        }
    }
}

fn coerce_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value >= 1)
}

/// Slices an already ordered sequence into the requested page.
/// A page past the end yields an empty slice.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let request = request.normalized();
    let total = items.len() as u64;
    let skip = usize::try_from(request.skip()).unwrap_or(usize::MAX);

    let data = items
        .into_iter()
        .skip(skip)
        .take(request.limit as usize)
        .collect();

    Page {
        data,
        pagination: request.pagination(total),
    }
}
