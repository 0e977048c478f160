//! Directives: stateful protocol adapters layered on the engine's events.
//!
//! Each directive holds its own clone of the engine plus whatever derived
//! state its protocol needs (a toggle counter, a cached page window), kept
//! consistent through event subscriptions instead of synchronous
//! re-queries. Directives track the listeners they register and remove all
//! of them on [`detach`] — an engine outliving its directives keeps
//! publishing to the remaining subscribers only.
//!
//! [`detach`]: SortDirective::detach

mod filter;
mod pagination;
mod search;
mod sort;
mod summary;
mod working;

pub use filter::FilterDirective;
pub use pagination::{PaginationDirective, PaginationState};
pub use search::SearchDirective;
pub use sort::SortDirective;
pub use summary::SummaryDirective;
pub use working::WorkingIndicatorDirective;
