use std::future::Future;

use crate::error::Result;

pub const DEFAULT_PER_PAGE: u32 = 100;

/// Page-increment pagination: keeps requesting until a page comes back
/// shorter than `per_page`.
pub struct Paginator {
    per_page: u32,
}

impl Paginator {
    pub fn new(per_page: u32) -> Self {
        Self { per_page: per_page.max(1) }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Calls `fetch_page` with 1-based page numbers and concatenates the
    /// results in request order. The first failing page aborts the whole
    /// fetch.
    pub async fn fetch_all<T, F, Fut>(&self, mut fetch_page: F) -> Result<Vec<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            let items = fetch_page(page).await?;
            let items_count = items.len();
            tracing::debug!("Page {} returned {} items", page, items_count);
            all_items.extend(items);

            if items_count < self.per_page as usize {
                break;
            }

            page += 1;
        }

        Ok(all_items)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;

    async fn run(total: usize, per_page: u32) -> (Vec<usize>, Vec<u32>) {
        let requested = RefCell::new(Vec::new());
        let items = Paginator::new(per_page)
            .fetch_all(|page| {
                requested.borrow_mut().push(page);
                let start = (page as usize - 1) * per_page as usize;
                let end = (start + per_page as usize).min(total);
                let chunk: Vec<usize> = (start.min(end)..end).collect();
                async move { Ok(chunk) }
            })
            .await
            .unwrap();
        (items, requested.into_inner())
    }

    #[tokio::test]
    async fn test_stops_on_short_page() {
        let (items, pages) = run(250, 100).await;
        assert_eq!(items.len(), 250);
        assert_eq!(pages, vec![1, 2, 3]);
        assert_eq!(items[0], 0);
        assert_eq!(items[249], 249);
    }

    #[tokio::test]
    async fn test_exact_multiple_requests_one_empty_page() {
        let (items, pages) = run(200, 100).await;
        assert_eq!(items.len(), 200);
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_listing_makes_single_request() {
        let (items, pages) = run(0, 100).await;
        assert!(items.is_empty());
        assert_eq!(pages, vec![1]);
    }

    #[tokio::test]
    async fn test_page_failure_aborts() {
        let result: Result<Vec<u8>> = Paginator::new(2)
            .fetch_all(|page| async move {
                if page == 2 {
                    Err(Error::AuthFailed)
                } else {
                    Ok(vec![1, 2])
                }
            })
            .await;
        assert!(matches!(result, Err(Error::AuthFailed)));
    }
}
