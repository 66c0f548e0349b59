use std::cmp::Ordering;

use crate::document::{Document, FieldValue, StoredDocument};

pub const NOTES: &str = "notes";
pub const PRODUCTS: &str = "products";
pub const USERS: &str = "users";

pub const TITLE: &str = "title";
pub const CONTENT: &str = "content";
pub const NAME: &str = "name";
pub const PRICE: &str = "price";

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_CONTENT: &str = "No content";
pub const DEFAULT_NAME: &str = "Unnamed";
pub const DEFAULT_PRICE: f64 = 0.0;

/// A record kind stored in its own collection.
pub trait Record: Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    /// Fields a user supplies when creating or editing a record.
    type Draft: Send + Sync;

    fn id(&self) -> &str;

    fn to_fields(draft: &Self::Draft) -> Document;

    /// Builds the record with defaults substituted, or `None` when every field
    /// is at its default.
    fn from_document(document: &StoredDocument) -> Option<Self>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

fn string_or(fields: &Document, key: &str, default: &str) -> String {
    fields
        .get(key)
        .and_then(FieldValue::as_str)
        .unwrap_or(default)
        .to_string()
}

impl Record for Note {
    const COLLECTION: &'static str = NOTES;

    type Draft = NoteDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(draft: &NoteDraft) -> Document {
        Document::from([
            (TITLE.to_string(), draft.title.as_str().into()),
            (CONTENT.to_string(), draft.content.as_str().into()),
        ])
    }

    fn from_document(document: &StoredDocument) -> Option<Self> {
        let title = string_or(&document.fields, TITLE, DEFAULT_TITLE);
        let content = string_or(&document.fields, CONTENT, DEFAULT_CONTENT);

        if title == DEFAULT_TITLE && content == DEFAULT_CONTENT {
            return None;
        }

        Some(Note {
            id: document.id.clone(),
            title,
            content,
        })
    }
}

impl Record for Product {
    const COLLECTION: &'static str = PRODUCTS;

    type Draft = ProductDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(draft: &ProductDraft) -> Document {
        Document::from([
            (NAME.to_string(), draft.name.as_str().into()),
            (PRICE.to_string(), draft.price.into()),
        ])
    }

    fn from_document(document: &StoredDocument) -> Option<Self> {
        let name = string_or(&document.fields, NAME, DEFAULT_NAME);
        let price = document
            .fields
            .get(PRICE)
            .and_then(FieldValue::as_f64)
            .filter(|price| price.is_finite())
            .unwrap_or(DEFAULT_PRICE);

        if name == DEFAULT_NAME && price == DEFAULT_PRICE {
            return None;
        }

        Some(Product {
            id: document.id.clone(),
            name,
            price,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceOrder {
    Ascending,
    Descending,
}

pub fn sort_by_price(products: &mut [Product], order: PriceOrder) {
    products.sort_by(|a, b| {
        let ordering: Ordering = a.price.total_cmp(&b.price);
        match order {
            PriceOrder::Ascending => ordering,
            PriceOrder::Descending => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: &str, fields: Document) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            fields,
        }
    }

    #[test]
    fn test_note_defaults() {
        let doc = stored(
            "n1",
            Document::from([(CONTENT.to_string(), "body".into())]),
        );

        let note = Note::from_document(&doc).unwrap();
        assert_eq!(note.id, "n1");
        assert_eq!(note.title, DEFAULT_TITLE);
        assert_eq!(note.content, "body");
    }

    #[test]
    fn test_mistyped_field_is_defaulted() {
        let doc = stored(
            "n2",
            Document::from([
                (TITLE.to_string(), FieldValue::IntegerValue(5)),
                (CONTENT.to_string(), "text".into()),
            ]),
        );

        assert_eq!(Note::from_document(&doc).unwrap().title, DEFAULT_TITLE);
    }

    #[test]
    fn test_empty_records_are_skipped() {
        assert_eq!(Note::from_document(&stored("n", Document::new())), None);
        assert_eq!(Product::from_document(&stored("p", Document::new())), None);

        let defaults = stored(
            "p",
            Document::from([
                (NAME.to_string(), DEFAULT_NAME.into()),
                (PRICE.to_string(), FieldValue::DoubleValue(0.0)),
            ]),
        );
        assert_eq!(Product::from_document(&defaults), None);
    }

    #[test]
    fn test_product_price() {
        let doc = stored(
            "p1",
            Document::from([(PRICE.to_string(), FieldValue::IntegerValue(12))]),
        );

        let product = Product::from_document(&doc).unwrap();
        assert_eq!(product.name, DEFAULT_NAME);
        assert_eq!(product.price, 12.0);

        let fields = Product::to_fields(&ProductDraft::new("Widget", 9.99));
        assert_eq!(fields.get(PRICE), Some(&FieldValue::DoubleValue(9.99)));
    }

    #[test]
    fn test_non_finite_price_is_defaulted() {
        let doc = stored(
            "p1",
            Document::from([
                (NAME.to_string(), "Widget".into()),
                (PRICE.to_string(), FieldValue::DoubleValue(f64::NAN)),
            ]),
        );
        assert_eq!(Product::from_document(&doc).unwrap().price, DEFAULT_PRICE);

        let doc = stored(
            "p2",
            Document::from([(PRICE.to_string(), FieldValue::DoubleValue(f64::INFINITY))]),
        );
        assert_eq!(Product::from_document(&doc), None);
    }

    #[test]
    fn test_sort_by_price() {
        let mut products: Vec<Product> = [("b", 5.5), ("a", 0.25), ("c", 100.0)]
            .into_iter()
            .map(|(id, price)| Product {
                id: id.to_string(),
                name: id.to_uppercase(),
                price,
            })
            .collect();

        sort_by_price(&mut products, PriceOrder::Ascending);
        let prices: Vec<f64> = products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![0.25, 5.5, 100.0]);

        sort_by_price(&mut products, PriceOrder::Descending);
        let prices: Vec<f64> = products.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![100.0, 5.5, 0.25]);
    }
}
