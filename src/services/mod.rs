// markshelf services
// Pure helpers and ambient services: tree traversal, tag and URL normalization,
// settings persistence and logging setup.

pub mod folder_tree;
pub mod logging;
pub mod settings_engine;
pub mod tags;
pub mod urls;
