// markshelf stores
// Each store exclusively owns one collection; `Selection` is session-local state.

pub mod bookmark_store;
pub mod folder_store;
pub mod selection;
pub mod tag_store;
