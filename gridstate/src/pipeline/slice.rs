//! Default pagination stage.

use super::{SliceFactory, Stage};
use crate::state::SliceSpec;

/// Default slice factory: returns the rows of the requested page.
///
/// An absent size means the whole input. Out-of-range pages yield an empty
/// result rather than an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSlice;

impl SliceFactory for DefaultSlice {
    fn build(&self, spec: &SliceSpec) -> Stage {
        let page = spec.page.max(1);
        let size = spec.size;

        Box::new(move |rows| {
            let actual_size = match size {
                Some(size) => size as usize,
                None => rows.len(),
            };
            let offset = (page as usize - 1).saturating_mul(actual_size);
            Ok(rows
                .into_iter()
                .skip(offset)
                .take(actual_size)
                .collect())
        })
    }
}
