//! Article transformer.

use search_indexer_shared::{ArticleDocument, ContentType, IndexDocument};
use serde_json::Value;

use super::{author, ContentTransformer};
use crate::processor::fields;

#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleTransformer;

impl ContentTransformer for ArticleTransformer {
    fn content_type(&self) -> ContentType {
        ContentType::Article
    }

    fn build_document(&self, record: Value) -> IndexDocument {
        IndexDocument::Article(ArticleDocument {
            title: fields::text(&record, "/gist/title"),
            description: fields::text(&record, "/gist/description"),
            author: author(&record),
            primary_category: fields::extract_optional_title(
                record.pointer("/gist/primaryCategory"),
            ),
            categories: fields::flatten_categories(record.get("categories")),
            tags: fields::flatten_tags(record.get("tags")),
            data: record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let document = ArticleTransformer.build_document(json!({"gist": {"title": "Hello"}}));
        let body = serde_json::to_value(&document).unwrap();

        assert_eq!(body["type"], "article");
        assert_eq!(body["articleTitle"], "Hello");
        for field in [
            "articleDescription",
            "articleAuthor",
            "articlePrimaryCategory",
            "articleCategories",
            "articleTags",
        ] {
            assert!(body.as_object().unwrap().contains_key(field), "{} missing", field);
            assert_eq!(body[field], Value::Null);
        }
    }
}
