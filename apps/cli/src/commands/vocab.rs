//! Vocabulary item commands.

use super::CommandError;
use crate::db::ItemRepository;
use crate::state::AppState;
use study_core::{ItemId, ItemPatch, NewItem, VocabularyItem};
use tracing::info;

#[derive(Debug, Clone, serde::Serialize)]
pub struct AddResult {
    pub item: VocabularyItem,
    /// False when the term was already stored and the existing item returned.
    pub created: bool,
}

/// Add an item. Adding a known term returns the stored item unchanged.
pub fn add_item(state: &AppState, item: NewItem) -> Result<AddResult, CommandError> {
    if item.term.trim().is_empty() {
        return Err(CommandError::invalid_argument("term must not be empty"));
    }
    if item.meaning.trim().is_empty() {
        return Err(CommandError::invalid_argument("meaning must not be empty"));
    }

    let repo = state.repository()?;
    if let Some(existing) = repo.find_by_term(&item.term)? {
        return Ok(AddResult {
            item: existing,
            created: false,
        });
    }

    let item = repo.add_item(&item, state.now())?;
    info!(id = item.id, term = %item.term, "added item");
    Ok(AddResult {
        item,
        created: true,
    })
}

pub fn get_item(state: &AppState, id: ItemId) -> Result<VocabularyItem, CommandError> {
    let repo = state.repository()?;
    repo.get_item(id)?.ok_or_else(|| CommandError::not_found(id))
}

/// Overwrite the supplied fields of an item.
pub fn update_item(state: &AppState, id: ItemId, patch: ItemPatch) -> Result<VocabularyItem, CommandError> {
    if patch.term.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(CommandError::invalid_argument("term must not be empty"));
    }
    if patch.meaning.as_deref().is_some_and(|m| m.trim().is_empty()) {
        return Err(CommandError::invalid_argument("meaning must not be empty"));
    }

    let repo = state.repository()?;
    let item = repo
        .update_item(id, &patch)?
        .ok_or_else(|| CommandError::not_found(id))?;
    info!(id, "updated item");
    Ok(item)
}

/// Delete an item. Its review history is kept.
pub fn delete_item(state: &AppState, id: ItemId) -> Result<bool, CommandError> {
    let repo = state.repository()?;
    let deleted = repo.delete_item(id)?;
    if deleted {
        info!(id, "deleted item");
    }
    Ok(deleted)
}

pub fn list_items(state: &AppState) -> Result<Vec<VocabularyItem>, CommandError> {
    let repo = state.repository()?;
    repo.all_items().map_err(Into::into)
}

/// Items whose term, meaning, example or tags contain `query`, ignoring case.
pub fn search_items(state: &AppState, query: &str) -> Result<Vec<VocabularyItem>, CommandError> {
    let items = list_items(state)?;
    Ok(items.into_iter().filter(|i| i.matches_query(query)).collect())
}

pub fn items_by_tag(state: &AppState, tag: &str) -> Result<Vec<VocabularyItem>, CommandError> {
    let items = list_items(state)?;
    Ok(items.into_iter().filter(|i| i.tags.contains(tag)).collect())
}
