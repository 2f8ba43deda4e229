//! Per-file fan-out. Files share no data, so with the `parallel` feature each
//! one is handled on the rayon pool; otherwise they run in order.

use crate::error::Result;

/// Apply `op` to every item, stopping at the first error.
///
/// Output order always matches input order.
#[cfg(feature = "parallel")]
pub(crate) fn map_files<I, T, F>(items: impl IntoIterator<Item = I>, op: F) -> Result<Vec<T>>
where
    I: Send,
    T: Send,
    F: Fn(I) -> Result<T> + Sync + Send,
{
    use rayon::prelude::*;

    items
        .into_iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(op)
        .collect()
}

/// Apply `op` to every item, stopping at the first error.
///
/// Output order always matches input order.
#[cfg(not(feature = "parallel"))]
pub(crate) fn map_files<I, T, F>(items: impl IntoIterator<Item = I>, op: F) -> Result<Vec<T>>
where
    I: Send,
    T: Send,
    F: Fn(I) -> Result<T> + Sync + Send,
{
    items.into_iter().map(op).collect()
}
