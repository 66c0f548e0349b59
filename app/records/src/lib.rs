//! # Records
//!
//! Data shared by every part of the client: the two record kinds and the flat
//! documents they are stored as.
//!
//! ## Collections
//! - `notes`: title (**string**), content (**string**)
//! - `products`: name (**string**), price (**double**)
//! - `users`: one profile document per account, keyed by the account id
//!
//! ## Reading
//! Documents carry no schema. Missing or mistyped fields are replaced by the
//! sentinel defaults below, and a document made only of defaults is skipped.
//!
//! ## Identifiers
//! Always assigned by the store on creation. The client never mints one.

pub mod document;
pub mod models;

pub use document::{ArrayValue, Document, FieldValue, MapValue, StoredDocument};
pub use models::{
    Note, NoteDraft, PriceOrder, Product, ProductDraft, Record, sort_by_price, DEFAULT_CONTENT,
    DEFAULT_NAME, DEFAULT_PRICE, DEFAULT_TITLE, NOTES, PRODUCTS, USERS,
};
