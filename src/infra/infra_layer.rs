// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "storage/json_document_store.rs"]
pub mod storage;

#[path = "minecraft/mod.rs"]
pub mod minecraft;
