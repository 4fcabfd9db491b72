// GDrive Music - Google Drive music library client
// Copyright (C) 2025 GDrive Music contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Lazy, continuation-driven sequences
//!
//! A [`PagedData`] is either a list that is already in memory or a
//! [`PageSource`] that is asked for one page at a time. The continuation is
//! opaque: whatever the source returned is handed back to it verbatim.
//! A page without a continuation ends the sequence.

use crate::error::Result;
use async_trait::async_trait;
use futures_util::stream::{self, Stream};
use std::fmt;
use std::sync::Arc;

/// One chunk of a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub continuation: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, continuation: Option<String>) -> Self {
        Self { items, continuation }
    }

    /// Final page
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            continuation: None,
        }
    }

    pub fn empty() -> Self {
        Self::last(Vec::new())
    }

    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}

#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// `None` asks for the first page
    async fn load_page(&self, continuation: Option<String>) -> Result<Page<T>>;
}

/// Restartable, forward-only sequence
pub enum PagedData<T> {
    Single(Arc<Vec<T>>),
    Continuous(Arc<dyn PageSource<T>>),
}

impl<T> Clone for PagedData<T> {
    fn clone(&self) -> Self {
        match self {
            PagedData::Single(items) => PagedData::Single(items.clone()),
            PagedData::Continuous(source) => PagedData::Continuous(source.clone()),
        }
    }
}

impl<T> fmt::Debug for PagedData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagedData::Single(items) => f.debug_tuple("Single").field(&items.len()).finish(),
            PagedData::Continuous(_) => f.write_str("Continuous(..)"),
        }
    }
}

impl<T> PagedData<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn single(items: Vec<T>) -> Self {
        PagedData::Single(Arc::new(items))
    }

    pub fn empty() -> Self {
        Self::single(Vec::new())
    }

    pub fn continuous<S: PageSource<T> + 'static>(source: S) -> Self {
        PagedData::Continuous(Arc::new(source))
    }

    /// Load one page. An in-memory list is served whole on the first call.
    pub async fn load_page(&self, continuation: Option<String>) -> Result<Page<T>> {
        match self {
            PagedData::Single(items) => match continuation {
                None => Ok(Page::last(items.as_ref().clone())),
                Some(_) => Ok(Page::empty()),
            },
            PagedData::Continuous(source) => source.load_page(continuation).await,
        }
    }

    /// Walk every page from the start
    pub async fn load_all(&self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut continuation = None;
        loop {
            let page = self.load_page(continuation).await?;
            all.extend(page.items);
            match page.continuation {
                Some(next) => continuation = Some(next),
                None => return Ok(all),
            }
        }
    }

    /// The sequence as a stream of pages; the first error ends it
    pub fn pages(&self) -> impl Stream<Item = Result<Page<T>>> + Send + 'static {
        let data = self.clone();
        stream::try_unfold(Some(None), move |state| next_page(data.clone(), state))
    }
}

/// `state` is `None` once the sequence has ended
async fn next_page<T>(
    data: PagedData<T>,
    state: Option<Option<String>>,
) -> Result<Option<(Page<T>, Option<Option<String>>)>>
where
    T: Clone + Send + Sync + 'static,
{
    let continuation = match state {
        Some(c) => c,
        None => return Ok(None),
    };
    let page = data.load_page(continuation).await?;
    let next = page.continuation.clone().map(Some);
    Ok(Some((page, next)))
}
