/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Follows `next` links on a collection until the server stops advertising
//! one, accumulating every page's items in place.

use crate::v0::api::ApiClient;
use crate::v0::errors::CtmsError;
use crate::v0::hal::Collection;
use tracing::{trace, warn};

/// Safety limits for a page walk.
///
/// Termination is otherwise in the server's hands: a server that always
/// returns `next` would never let the walk finish. The default cap of 1000
/// pages is far beyond any sane folder; `max_pages: None` restores fully
/// server-driven termination.
#[derive(Debug, Clone)]
pub struct PageWalk {
    pub max_pages: Option<usize>,
}

impl Default for PageWalk {
    fn default() -> Self {
        Self {
            max_pages: Some(1000),
        }
    }
}

/// Drains every remaining page of `collection` into it, in server order.
///
/// A page that embeds no items counts as zero items, not an error. Draining
/// an already-drained collection (no `next` link) is a no-op. Hitting the
/// safety cap fails with [`CtmsError::PageLimitExceeded`].
pub async fn drain_pages(
    api: &ApiClient,
    collection: &mut Collection,
    walk: &PageWalk,
) -> Result<(), CtmsError> {
    let mut pages = 0usize;

    while let Some(next) = collection.links.next.take() {
        pages += 1;
        if walk.max_pages.is_some_and(|cap| pages > cap) {
            return Err(CtmsError::PageLimitExceeded(pages));
        }

        let page: Collection = api.get(&next.href).await?;
        if let Some(paging) = &page.paging {
            trace!(
                action = "page",
                "page at offset {} of {} total elements, {} item(s) accumulated",
                paging.offset,
                paging.total_elements,
                collection.embedded.items.len() + page.embedded.items.len()
            );
        }

        collection.embedded.items.extend(page.embedded.items);
        collection.links.next = page.links.next;
    }

    // Advisory only: the accumulated count should match what the first page
    // promised once `next` is exhausted.
    if let Some(paging) = &collection.paging {
        let accumulated = collection.embedded.items.len() as u64;
        if paging.total_elements != 0 && accumulated != paging.total_elements {
            warn!(
                action = "page",
                "collection drained to {accumulated} item(s) but paging promised {}",
                paging.total_elements
            );
        }
    }

    Ok(())
}
