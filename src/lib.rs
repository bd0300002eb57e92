//! # Script Block Core
//!
//! An in-memory document model for structured script editors. Screenplay
//! content is split into typed blocks (character cues, dialogue, action
//! lines, ...) that can point at a parent block, and a derived cast report
//! counts the lines of every character.
//!
//! ## Features
//!
//! - **Typed buckets**: blocks are grouped by type and keep insertion order
//! - **Stable ids**: `TYPE_N` identifiers from one counter that never rewinds
//! - **Relation tracking**: child to parent links, cleaned up on removal
//! - **Cast report**: per-character line counts, merged case-insensitively
//! - **FFI-ready**: C-compatible functions exchanging JSON for editor hosts
//!
//! ## Quick Start
//!
//! ```rust
//! use script_block_core::BlockRepository;
//!
//! let mut repository = BlockRepository::new();
//! let alice = repository.add_block("CHARACTER", "ALICE", None);
//! repository.add_block("DIALOGUE", "Hi", Some(alice.clone()));
//!
//! let cast = repository.characters();
//! assert_eq!(cast[0].name, "ALICE");
//! assert_eq!(cast[0].lines, 1);
//! ```
//!
//! ## FFI Functions
//!
//! Every function returning `*const c_char` answers with a JSON-encoded
//! [`AppResponse`] that must be released with [`free_response`]:
//!
//! - [`create_repository`] - Create a repository handle
//! - [`add_block`] - Add a block, optionally under a parent
//! - [`get_block`] - Retrieve a block by id
//! - [`get_blocks_by_type`] - Retrieve every block of one type
//! - [`get_all_blocks`] - Retrieve the whole bucket table
//! - [`update_block`] - Replace the content of a block
//! - [`remove_block`] - Remove a block and its relations
//! - [`get_related_block`] - Parent of a block
//! - [`get_related_blocks`] - Children of a block
//! - [`clear_blocks`] - Remove all blocks, keeping the id counter
//! - [`get_characters`] - Cast report
//! - [`destroy_repository`] - Release a handle

pub mod block_model;
pub mod block_repository;
pub mod block_state;
pub mod characters;
pub mod repository_config;
mod app_response;

pub use crate::app_response::AppResponse;
pub use crate::block_model::{Block, BlockId, BlockType};
pub use crate::block_repository::{BlockRepository, BlockTable, TypeBucket};
pub use crate::block_state::AppBlockState;
pub use crate::characters::{CharacterLine, CharacterSummary};
pub use crate::repository_config::RepositoryConfig;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use log::{info, warn};

/// Creates a new repository handle.
///
/// # Parameters
///
/// * `config_json` - Null-terminated JSON [`RepositoryConfig`], or null for defaults
///
/// # Returns
///
/// A pointer to the [`AppBlockState`] on success, or a null pointer if the
/// configuration is not valid UTF-8 or not a valid configuration. Release
/// the handle with [`destroy_repository`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use script_block_core::{create_repository, destroy_repository};
///
/// let config = CString::new(r#"{"name": "pilot"}"#).unwrap();
/// let state = create_repository(config.as_ptr());
/// assert!(!state.is_null());
///
/// destroy_repository(state);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_repository(config_json: *const c_char) -> *mut AppBlockState {
    let config = if config_json.is_null() {
        RepositoryConfig::default()
    } else {
        let json = match unsafe { CStr::from_ptr(config_json).to_str() } {
            Ok(s) => s,
            Err(e) => {
                warn!("Invalid UTF-8 in repository configuration: {e}");
                return std::ptr::null_mut();
            }
        };

        match RepositoryConfig::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                warn!("❌ {e}");
                return std::ptr::null_mut();
            }
        }
    };

    info!("✅ Repository '{}' created", config.name);
    Box::into_raw(Box::new(AppBlockState::init(config)))
}

/// Adds a block and returns its id.
///
/// # Parameters
///
/// * `state` - Repository handle
/// * `block_type` - Type tag (required; any string is accepted)
/// * `content` - Block text, or null for an empty block
/// * `parent_id` - Id of the parent block, or null for none
///
/// # Returns
///
/// `{"Ok": "<new id>"}`, or `BadRequest` for a null handle, a null type or
/// invalid UTF-8.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use script_block_core::{add_block, create_repository};
///
/// let state = create_repository(std::ptr::null());
///
/// let block_type = CString::new("CHARACTER").unwrap();
/// let content = CString::new("ALICE").unwrap();
/// let result = add_block(state, block_type.as_ptr(), content.as_ptr(), std::ptr::null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_block(
    state: *mut AppBlockState,
    block_type: *const c_char,
    content: *const c_char,
    parent_id: *const c_char,
) -> *const c_char {
    let state = match state_from_ptr(state, "add_block") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    let block_type = match c_ptr_to_string(block_type, "block type") {
        Ok(block_type) => block_type,
        Err(error_ptr) => return error_ptr,
    };

    let content = match optional_c_ptr_to_string(content, "content") {
        Ok(content) => content.unwrap_or_default(),
        Err(error_ptr) => return error_ptr,
    };

    let parent = match optional_c_ptr_to_string(parent_id, "parent id") {
        Ok(parent) => parent.map(BlockId::from),
        Err(error_ptr) => return error_ptr,
    };

    let id = state.with_repository(|repository| repository.add_block(block_type, content, parent));
    response_to_c_string(&AppResponse::Ok(id.to_string()))
}

/// Retrieves a block by its id.
///
/// # Returns
///
/// `{"Ok": "<block json>"}` if the block exists, otherwise `NotFound`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_block(state: *mut AppBlockState, id: *const c_char) -> *const c_char {
    let state = match state_from_ptr(state, "get_block") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let response = state.with_repository(|repository| match repository.get_block(&id_str) {
        Some(block) => AppResponse::json(block),
        None => AppResponse::NotFound(format!("No block found with id: {id_str}")),
    });
    response_to_c_string(&response)
}

/// Retrieves every block of one type, in insertion order.
///
/// An unknown type yields an empty JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_blocks_by_type(state: *mut AppBlockState, block_type: *const c_char) -> *const c_char {
    let state = match state_from_ptr(state, "get_blocks_by_type") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    let block_type = match c_ptr_to_string(block_type, "block type") {
        Ok(block_type) => block_type,
        Err(error_ptr) => return error_ptr,
    };

    let response = state.with_repository(|repository| AppResponse::json(repository.blocks_by_type(&block_type)));
    response_to_c_string(&response)
}

/// Retrieves the whole bucket table as a JSON object `type -> [block]`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all_blocks(state: *mut AppBlockState) -> *const c_char {
    let state = match state_from_ptr(state, "get_all_blocks") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    let response = state.with_repository(|repository| AppResponse::json(&repository.all_blocks()));
    response_to_c_string(&response)
}

/// Replaces the content of an existing block.
///
/// # Returns
///
/// `Ok` on success, `NotFound` for an unknown id and `BadRequest` for null
/// arguments. An unknown id leaves the repository untouched.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use script_block_core::{create_repository, update_block};
///
/// let state = create_repository(std::ptr::null());
///
/// let id = CString::new("ACTION_1").unwrap();
/// let content = CString::new("The door creaks open.").unwrap();
/// let result = update_block(state, id.as_ptr(), content.as_ptr());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_block(state: *mut AppBlockState, id: *const c_char, content: *const c_char) -> *const c_char {
    let state = match state_from_ptr(state, "update_block") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let content = match c_ptr_to_string(content, "content") {
        Ok(content) => content,
        Err(error_ptr) => return error_ptr,
    };

    let response = if state.with_repository(|repository| repository.update_block(&id_str, content)) {
        AppResponse::Ok(format!("Block {id_str} updated successfully"))
    } else {
        AppResponse::NotFound(format!("No block found with id: {id_str}"))
    };
    response_to_c_string(&response)
}

/// Removes a block along with every relation naming it.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn remove_block(state: *mut AppBlockState, id: *const c_char) -> *const c_char {
    let state = match state_from_ptr(state, "remove_block") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let response = if state.with_repository(|repository| repository.remove_block(&id_str)) {
        AppResponse::Ok(format!("Block {id_str} removed successfully"))
    } else {
        AppResponse::NotFound(format!("No block found with id: {id_str}"))
    };
    response_to_c_string(&response)
}

/// Returns the parent id of a block, or `NotFound` if it has none.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_related_block(state: *mut AppBlockState, id: *const c_char) -> *const c_char {
    let state = match state_from_ptr(state, "get_related_block") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let response = state.with_repository(|repository| match repository.related_block(&id_str) {
        Some(parent) => AppResponse::Ok(parent.to_string()),
        None => AppResponse::NotFound(format!("No related block for id: {id_str}")),
    });
    response_to_c_string(&response)
}

/// Returns the ids of every child of a block as a JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_related_blocks(state: *mut AppBlockState, id: *const c_char) -> *const c_char {
    let state = match state_from_ptr(state, "get_related_blocks") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let response = state.with_repository(|repository| AppResponse::json(&repository.related_blocks(&id_str)));
    response_to_c_string(&response)
}

/// Removes every block and relation. Ids issued afterwards keep counting up.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_blocks(state: *mut AppBlockState) -> *const c_char {
    let state = match state_from_ptr(state, "clear_blocks") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    state.with_repository(|repository| repository.clear_blocks());
    response_to_c_string(&AppResponse::success("All blocks cleared successfully"))
}

/// Returns the cast report as a JSON array of `{"name", "lines"}`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_characters(state: *mut AppBlockState) -> *const c_char {
    let state = match state_from_ptr(state, "get_characters") {
        Ok(state) => state,
        Err(error_ptr) => return error_ptr,
    };

    let response = state.with_repository(|repository| AppResponse::json(&repository.characters()));
    response_to_c_string(&response)
}

/// Releases a string returned by any of the functions above.
///
/// Passing null is a no-op.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

/// Releases a repository handle created by [`create_repository`].
///
/// The handle must not be used afterwards. Passing null is a no-op.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn destroy_repository(state: *mut AppBlockState) {
    if state.is_null() {
        warn!("Null state pointer passed to destroy_repository");
        return;
    }

    let state = unsafe { Box::from_raw(state) };
    info!("Repository '{}' destroyed", state.lock().config().name);
}

/// Borrows the state behind a handle, or builds the `BadRequest` answer.
fn state_from_ptr<'a>(state: *mut AppBlockState, fn_name: &str) -> Result<&'a AppBlockState, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(state) => Ok(state),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

/// Converts an [`AppResponse`] to a C-compatible string.
///
/// Returns a null pointer if serialization or C string creation fails. The
/// caller releases the string with [`free_response`].
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a required C string argument into a Rust `String`.
///
/// # Returns
///
/// * `Ok(String)` - If conversion was successful
/// * `Err(*const c_char)` - `BadRequest` response for null pointers or invalid UTF-8
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    match optional_c_ptr_to_string(ptr, field_name)? {
        Some(s) => Ok(s),
        None => {
            let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
            Err(response_to_c_string(&error))
        }
    }
}

/// Like [`c_ptr_to_string`], but a null pointer means "not given".
fn optional_c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<Option<String>, *const c_char> {
    if ptr.is_null() {
        return Ok(None);
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(Some(s.to_string())),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
