//! Pagination state derived from the backend's page envelope.
//!
//! The server never returns the current page number; it is reconstructed
//! from the `page` query parameter of the adjacent-page references. The
//! heuristic matches the server's paginator: `next` always carries a `page`
//! parameter, while `previous` omits it for the first page.

use api_client::{ImagePage, PAGE_SIZE};
use url::Url;

/// Navigation-affordance state plus the page indicator derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNav {
    pub current_page: u64,
    pub total_pages: u64,
    /// Target of the previous-page affordance; disabled when `None`.
    pub previous: Option<String>,
    /// Target of the next-page affordance; disabled when `None`.
    pub next: Option<String>,
}

impl PageNav {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }
}

pub fn derive_nav(page: &ImagePage) -> PageNav {
    let total_pages = ((page.count + PAGE_SIZE - 1) / PAGE_SIZE).max(1);

    let current_page = if let Some(next) = &page.next {
        page_param(next).unwrap_or(0).saturating_sub(1)
    } else if let Some(previous) = &page.previous {
        // A previous reference without a page parameter points at page 1,
        // which the paginator encodes as page 0 here.
        page_param(previous).unwrap_or(0) + 1
    } else {
        1
    };

    PageNav {
        current_page,
        total_pages,
        previous: page.previous.clone(),
        next: page.next.clone(),
    }
}

fn page_param(reference: &str) -> Option<u64> {
    let url = Url::parse(reference).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
