//! Lazy iteration over cursor-paginated endpoints.

use std::{collections::VecDeque, future::Future};

use futures::{stream, Stream};

use crate::{Page, ProcurosError, Result};

struct PageState<F, T> {
    fetch: F,
    buffered: VecDeque<T>,
    cursor: Option<String>,
    exhausted: bool,
}

/// Yields every item of every page, fetching the next page only once the
/// buffered items are consumed. `fetch` receives the cursor (`None` for the
/// first page). The stream ends after the first page without a cursor, or
/// after the first error.
pub(crate) fn paginate<'a, T, F, Fut>(fetch: F) -> impl Stream<Item = Result<T>> + 'a
where
    T: 'a,
    F: FnMut(Option<String>) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>>> + 'a,
{
    let state = PageState {
        fetch,
        buffered: VecDeque::new(),
        cursor: None,
        exhausted: false,
    };

    stream::try_unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.buffered.pop_front() {
                return Ok::<_, ProcurosError>(Some((item, state)));
            }
            if state.exhausted {
                return Ok(None);
            }

            let page = (state.fetch)(state.cursor.take()).await?;
            state.cursor = page.next_cursor.filter(|cursor| !cursor.is_empty());
            state.exhausted = state.cursor.is_none();
            state.buffered.extend(page.items);
        }
    })
}
