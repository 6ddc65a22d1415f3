//! Lazy, restartable paginated sequences
//!
//! A [`Paginated`] collection wraps a page source `fetch(cursor)` and hands
//! out iterators that walk the pages on demand:
//!
//! - every call to [`Paginated::iter`] starts over from the first page
//! - crossing a page boundary makes exactly one fetch, never ahead of time
//! - a failed fetch is yielded once as `Error::Pagination`, after which the
//!   iterator is exhausted
//!
//! ```rust
//! use mlflow_rest_client::page::{Page, Paginated};
//!
//! let numbers = Paginated::new(|cursor: Option<&str>| {
//!     Ok(match cursor {
//!         None => Page::new(vec![1, 2], Some("next".to_string())),
//!         Some(_) => Page::last(vec![3]),
//!     })
//! });
//! assert_eq!(numbers.collect_all().unwrap(), vec![1, 2, 3]);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::{Error, Result};

/// One page of results plus the cursor for the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page, in server order.
    pub items: Vec<T>,
    /// Cursor for the following page; `None` on the last page.
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Create a page; an empty token is treated as the end of the sequence.
    #[must_use]
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token: next_page_token.filter(|token| !token.is_empty()),
        }
    }

    /// Final page.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}

type FetchFn<T> = dyn Fn(Option<&str>) -> Result<Page<T>> + Send + Sync;

/// Restartable factory of page-walking iterators.
///
/// Holds no cursor state itself; cloning shares the page source.
pub struct Paginated<T> {
    fetch: Arc<FetchFn<T>>,
    start: Option<String>,
}

impl<T> Clone for Paginated<T> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
            start: self.start.clone(),
        }
    }
}

impl<T> fmt::Debug for Paginated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginated").field("start", &self.start).finish_non_exhaustive()
    }
}

impl<T> Paginated<T> {
    /// Wrap a page source. `fetch(None)` must return the first page.
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn(Option<&str>) -> Result<Page<T>> + Send + Sync + 'static,
    {
        Self {
            fetch: Arc::new(fetch),
            start: None,
        }
    }

    /// Start every iteration at `token` instead of the first page.
    #[must_use]
    pub fn starting_at(mut self, token: impl Into<String>) -> Self {
        self.start = Some(token.into()).filter(|token: &String| !token.is_empty());
        self
    }

    /// Fresh iterator from the starting cursor. No fetch happens until the
    /// first call to `next`.
    #[must_use]
    pub fn iter(&self) -> PageIter<'_, T> {
        PageIter {
            fetch: self.fetch.as_ref(),
            buffer: VecDeque::new(),
            cursor: self.start.clone(),
            page: 0,
            state: IterState::Fresh,
        }
    }

    /// Fetch every page and return all items in order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pagination` for the first failed page; items from
    /// earlier pages are discarded.
    pub fn collect_all(&self) -> Result<Vec<T>> {
        self.iter().collect()
    }

    /// Fetch pages until the end or the first failure, keeping whatever
    /// arrived before it.
    #[must_use]
    pub fn collect_partial(&self) -> (Vec<T>, Option<Error>) {
        let mut items = Vec::new();
        for item in self.iter() {
            match item {
                Ok(item) => items.push(item),
                Err(err) => return (items, Some(err)),
            }
        }
        (items, None)
    }
}

impl<'a, T> IntoIterator for &'a Paginated<T> {
    type Item = Result<T>;
    type IntoIter = PageIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterState {
    Fresh,
    Walking,
    Done,
}

/// Iterator over the items of a [`Paginated`] collection.
pub struct PageIter<'a, T> {
    fetch: &'a FetchFn<T>,
    buffer: VecDeque<T>,
    cursor: Option<String>,
    page: usize,
    state: IterState,
}

impl<T> PageIter<'_, T> {
    /// Number of pages fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.page
    }
}

impl<T> Iterator for PageIter<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            match self.state {
                IterState::Done => return None,
                IterState::Walking if self.cursor.is_none() => {
                    self.state = IterState::Done;
                    return None;
                }
                IterState::Fresh | IterState::Walking => {}
            }

            self.page += 1;
            tracing::debug!(page = self.page, cursor = ?self.cursor, "fetching page");
            match (self.fetch)(self.cursor.as_deref()) {
                Ok(page) => {
                    self.buffer = page.items.into();
                    self.cursor = page.next_page_token.filter(|token| !token.is_empty());
                    self.state = IterState::Walking;
                }
                Err(source) => {
                    self.state = IterState::Done;
                    self.buffer.clear();
                    return Some(Err(Error::Pagination {
                        page: self.page,
                        source: Box::new(source),
                    }));
                }
            }
        }
    }
}

impl<T> std::iter::FusedIterator for PageIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Three pages of two items each, recording every cursor it sees.
    fn scripted(log: Arc<Mutex<Vec<Option<String>>>>) -> Paginated<u32> {
        Paginated::new(move |cursor: Option<&str>| {
            log.lock().unwrap().push(cursor.map(str::to_string));
            Ok(match cursor {
                None => Page::new(vec![1, 2], Some("p2".into())),
                Some("p2") => Page::new(vec![3, 4], Some("p3".into())),
                Some(_) => Page::new(vec![5, 6], Some(String::new())),
            })
        })
    }

    #[test]
    fn test_concatenates_pages_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pages = scripted(Arc::clone(&log));
        assert_eq!(pages.collect_all().unwrap(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_restarts_from_first_page() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pages = scripted(Arc::clone(&log));
        let first: Vec<_> = pages.iter().collect::<Result<_>>().unwrap();
        let second: Vec<_> = pages.iter().collect::<Result<_>>().unwrap();
        assert_eq!(first, second);

        let seen = log.lock().unwrap().clone();
        let expected = vec![None, Some("p2".to_string()), Some("p3".to_string())];
        assert_eq!(seen[..3], expected[..]);
        assert_eq!(seen[3..], expected[..]);
    }

    #[test]
    fn test_no_fetch_until_consumed() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pages = scripted(Arc::clone(&log));
        let mut iter = pages.iter();
        assert!(log.lock().unwrap().is_empty());
        iter.next();
        iter.next();
        assert_eq!(iter.pages_fetched(), 1);
        iter.next();
        assert_eq!(iter.pages_fetched(), 2);
    }

    #[test]
    fn test_failure_is_terminal() {
        let pages = Paginated::new(|cursor: Option<&str>| match cursor {
            None => Ok(Page::new(vec!["a"], Some("boom".into()))),
            Some(_) => Err(Error::RemoteRequest {
                status: 500,
                error_code: String::new(),
                message: "down".into(),
            }),
        });
        let mut iter = pages.iter();
        assert_eq!(iter.next().unwrap().unwrap(), "a");
        let err = iter.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Pagination { page: 2, .. }));
        assert_eq!(err.status(), Some(500));
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());

        assert!(pages.collect_all().is_err());
        let (partial, err) = pages.collect_partial();
        assert_eq!(partial, vec!["a"]);
        assert!(err.is_some());
    }

    #[test]
    fn test_empty_middle_page_continues() {
        let pages = Paginated::new(|cursor: Option<&str>| {
            Ok(match cursor {
                None => Page::new(Vec::new(), Some("more".into())),
                Some(_) => Page::last(vec![7]),
            })
        });
        assert_eq!(pages.collect_all().unwrap(), vec![7]);
    }

    #[test]
    fn test_starting_at() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pages = scripted(Arc::clone(&log)).starting_at("p3");
        assert_eq!(pages.collect_all().unwrap(), vec![5, 6]);
        assert_eq!(log.lock().unwrap()[0].as_deref(), Some("p3"));
    }
}
