use crate::registry::GridHandle;

use thiserror::Error;

/// Errors surfaced by the checked grid surfaces.
///
/// Point access and traversal on a [`Grid`](crate::Grid) held directly cannot
/// fail; errors only arise from handles and from indexed snapshot access.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The handle's grid was destroyed, or the handle never referred to one.
    #[error("stale or unknown grid handle {0:?}")]
    StaleHandle(GridHandle),

    /// A snapshot was indexed at or past its captured count.
    #[error("iteration index {index} out of range for count {count}")]
    IndexOutOfRange { index: usize, count: usize },
}
