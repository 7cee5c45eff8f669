//! RPC method handler for the markshelf JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested without stdio.
//! `handle_method` decodes params, calls into the [`Library`] and encodes the
//! result. Store failures come back as `{"kind": ..., "message": ...}`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::Library;
use crate::managers::bookmark_store::BookmarkStoreTrait;
use crate::managers::folder_store::FolderStoreTrait;
use crate::managers::tag_store::TagStoreTrait;
use crate::services::tags::parse_tag_list;
use crate::types::bookmark::{BookmarkDraft, BookmarkPatch};
use crate::types::errors::StoreError;
use crate::types::folder::{FolderDraft, FolderPatch};
use crate::types::tag::TagDraft;

/// Error payload of a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    pub kind: String,
    pub message: String,
}

impl RpcError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            kind: "invalid_params".to_string(),
            message: message.into(),
        }
    }

    fn unknown_method(method: &str) -> Self {
        Self {
            kind: "unknown_method".to_string(),
            message: format!("unknown method: {}", method),
        }
    }
}

impl From<StoreError> for RpcError {
    fn from(err: StoreError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

type RpcResult = Result<Value, RpcError>;

fn to_json<T: Serialize>(value: &T) -> RpcResult {
    serde_json::to_value(value).map_err(|e| RpcError {
        kind: "internal".to_string(),
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(params: &Value) -> Result<T, RpcError> {
    serde_json::from_value(params.clone()).map_err(|e| RpcError::invalid_params(e.to_string()))
}

fn require_i64(params: &Value, key: &str) -> Result<i64, RpcError> {
    params
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| RpcError::invalid_params(format!("missing {}", key)))
}

/// Absent or `null` means `None`; anything else must be an integer.
fn optional_i64(params: &Value, key: &str) -> Result<Option<i64>, RpcError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| RpcError::invalid_params(format!("{} must be an integer", key))),
    }
}

fn require_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params(format!("missing {}", key)))
}

fn limit_or(params: &Value, default: usize) -> usize {
    params
        .get("limit")
        .and_then(Value::as_u64)
        .map(|l| l as usize)
        .unwrap_or(default)
}

/// Accepts `tags` either as an array or as a comma-separated string.
fn with_tag_list(params: &Value) -> Value {
    let mut params = params.clone();
    if let Some(raw) = params.get("tags").and_then(Value::as_str).map(str::to_string) {
        params["tags"] = json!(parse_tag_list(&raw));
    }
    params
}

fn selection_state(lib: &Library) -> Value {
    json!({
        "active": lib.selection.is_active(),
        "ids": lib.selection.ids(),
    })
}

/// Dispatch a JSON-RPC method call to the library.
pub async fn handle_method(lib: &mut Library, method: &str, params: &Value) -> RpcResult {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Bookmarks ───
        "bookmark.list" => to_json(&lib.bookmarks.get_all().await?),
        "bookmark.get" => {
            let id = require_i64(params, "id")?;
            to_json(&lib.bookmarks.get_by_id(id).await?)
        }
        "bookmark.by_folder" => {
            let folder_id = optional_i64(params, "folder_id")?;
            to_json(&lib.bookmarks.get_by_folder(folder_id).await?)
        }
        "bookmark.search" => {
            let query = params.get("query").and_then(Value::as_str).unwrap_or("");
            to_json(&lib.bookmarks.search(query).await?)
        }
        "bookmark.create" => {
            let draft: BookmarkDraft = decode(&with_tag_list(params))?;
            to_json(&lib.add_bookmark(draft).await?)
        }
        "bookmark.update" => {
            let id = require_i64(params, "id")?;
            let patch: BookmarkPatch = decode(&with_tag_list(params))?;
            to_json(&lib.edit_bookmark(id, patch).await?)
        }
        "bookmark.delete" => {
            let id = require_i64(params, "id")?;
            lib.remove_bookmark(id).await?;
            Ok(json!({"ok": true}))
        }
        "bookmark.bulk_delete" => {
            let ids: Vec<i64> = params
                .get("ids")
                .map(decode::<Vec<i64>>)
                .transpose()?
                .ok_or_else(|| RpcError::invalid_params("missing ids"))?;
            let deleted = lib.delete_bookmarks(&ids).await?;
            Ok(json!({"deleted": deleted}))
        }
        "bookmark.open" => {
            let id = require_i64(params, "id")?;
            to_json(&lib.open_bookmark(id).await?)
        }
        "bookmark.recent" => {
            let limit = limit_or(params, lib.settings().recent_limit);
            to_json(&lib.bookmarks.get_recent(limit).await?)
        }
        "bookmark.popular" => {
            let limit = limit_or(params, lib.settings().popular_limit);
            to_json(&lib.bookmarks.get_popular(limit).await?)
        }

        // ─── Folders ───
        "folder.list" => to_json(&lib.folders.get_all().await?),
        "folder.get" => {
            let id = require_i64(params, "id")?;
            to_json(&lib.folders.get_by_id(id).await?)
        }
        "folder.roots" => to_json(&lib.folders.get_root_folders().await?),
        "folder.subfolders" => {
            let parent_id = require_i64(params, "parent_id")?;
            to_json(&lib.folders.get_subfolders(parent_id).await?)
        }
        "folder.create" => {
            let draft: FolderDraft = decode(params)?;
            to_json(&lib.folders.create(draft).await?)
        }
        "folder.update" => {
            let id = require_i64(params, "id")?;
            let patch: FolderPatch = decode(params)?;
            to_json(&lib.folders.update(id, patch).await?)
        }
        "folder.delete" => {
            let id = require_i64(params, "id")?;
            let moved = lib.remove_folder(id).await?;
            Ok(json!({"ok": true, "moved": moved}))
        }
        "folder.set_count" => {
            let id = require_i64(params, "id")?;
            let count = params
                .get("count")
                .and_then(Value::as_u64)
                .ok_or_else(|| RpcError::invalid_params("missing count"))?;
            to_json(&lib.folders.update_bookmark_count(id, count).await?)
        }
        "folder.tree" => {
            let root = optional_i64(params, "root")?;
            to_json(&lib.folder_tree(root).await?)
        }
        "folder.ancestors" => {
            let id = require_i64(params, "id")?;
            to_json(&lib.folders.ancestors(id).await?)
        }

        // ─── Tags ───
        "tag.list" => to_json(&lib.tags.get_all().await?),
        "tag.popular" => {
            let limit = limit_or(params, lib.settings().popular_tags_limit);
            to_json(&lib.tags.get_popular(limit).await?)
        }
        "tag.search" => {
            let query = params.get("query").and_then(Value::as_str).unwrap_or("");
            to_json(&lib.tags.search(query).await?)
        }
        "tag.create" => {
            let draft: TagDraft = decode(params)?;
            to_json(&lib.tags.create(draft).await?)
        }
        "tag.increment" => {
            let name = require_str(params, "name")?;
            to_json(&lib.tags.increment_usage(name).await?)
        }

        // ─── Selection ───
        "selection.toggle" => {
            let id = require_i64(params, "id")?;
            let selected = lib.toggle_selection(id);
            let mut state = selection_state(lib);
            state["selected"] = json!(selected);
            Ok(state)
        }
        "selection.clear" => {
            lib.clear_selection();
            Ok(selection_state(lib))
        }
        "selection.get" => Ok(selection_state(lib)),
        "selection.delete" => {
            let deleted = lib.delete_selected().await?;
            let mut state = selection_state(lib);
            state["deleted"] = json!(deleted);
            Ok(state)
        }

        // ─── Library ───
        "library.recompute_counts" => {
            let corrected = lib.recompute_bookmark_counts().await?;
            Ok(json!({"corrected": corrected}))
        }

        _ => Err(RpcError::unknown_method(method)),
    }
}
