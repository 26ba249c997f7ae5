//! Paginated result sets and their navigation links.
//!
//! Links carry every filter parameter the caller supplied, so following
//! `next` reproduces the same filtered, ordered collection one page later.

use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded::Serializer;

/// Query-string keys that steer pagination rather than filter rows.
pub const PAGE_KEYS: [&str; 2] = ["page", "per_page"];

#[derive(Debug, Clone, PartialEq)]
pub struct PaginateRequest {
    pub per_page: Option<u32>,
    pub page: u32,
    pub columns: Option<Vec<String>>,
    pub total: Option<u64>,
    pub filters: Map<String, Value>,
    pub path: String,
}

impl Default for PaginateRequest {
    fn default() -> Self {
        Self {
            per_page: None,
            page: 1,
            columns: None,
            total: None,
            filters: Map::new(),
            path: String::new(),
        }
    }
}

impl PaginateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Caller filters without the pagination keys.
    pub fn filter_params(&self) -> Map<String, Value> {
        self.filters
            .iter()
            .filter(|(key, _)| !PAGE_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// A total already known to the caller; skips the count query.
    pub fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn filters(mut self, filters: Map<String, Value>) -> Self {
        self.filters = filters;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl PageMeta {
    pub fn new(current_page: u32, per_page: u32, total: u64, items_on_page: usize) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(u64::from(per_page)).max(1).min(u64::from(u32::MAX)) as u32;
        let (from, to) = if items_on_page == 0 {
            (None, None)
        } else {
            let from = u64::from(current_page.saturating_sub(1)) * u64::from(per_page) + 1;
            (Some(from), Some(from + items_on_page as u64 - 1))
        };

        Self {
            current_page,
            per_page,
            total,
            last_page,
            from,
            to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    pub fn build(path: &str, filters: &Map<String, Value>, meta: &PageMeta) -> Self {
        let link = |page: u32| page_url(path, filters, meta.per_page, page);
        Self {
            first: link(1),
            last: link(meta.last_page),
            prev: (meta.current_page > 1).then(|| link(meta.current_page - 1)),
            next: (meta.current_page < meta.last_page).then(|| link(meta.current_page + 1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub links: PageLinks,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
            links: self.links,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Link to `page`, keeping every caller filter in the query string.
pub fn page_url(path: &str, filters: &Map<String, Value>, per_page: u32, page: u32) -> String {
    let mut query = Serializer::new(String::new());
    for (key, value) in filters {
        if PAGE_KEYS.contains(&key.as_str()) {
            continue;
        }
        append_param(&mut query, key, value);
    }
    query.append_pair("per_page", &per_page.to_string());
    query.append_pair("page", &page.to_string());
    format!("{}?{}", path, query.finish())
}

fn append_param(query: &mut Serializer<'_, String>, key: &str, value: &Value) {
    match value {
        Value::Null => {
            query.append_pair(key, "");
        }
        Value::String(text) => {
            query.append_pair(key, text);
        }
        Value::Array(items) => {
            let key = format!("{}[]", key);
            for item in items {
                append_param(query, &key, item);
            }
        }
        Value::Object(nested) => {
            for (inner, item) in nested {
                append_param(query, &format!("{}[{}]", key, inner), item);
            }
        }
        other => {
            query.append_pair(key, &other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_for_empty_result() {
        let meta = PageMeta::new(1, 15, 0, 0);
        assert_eq!(meta.last_page, 1);
        assert_eq!(meta.from, None);
        assert_eq!(meta.to, None);
    }

    #[test]
    fn meta_for_middle_page() {
        let meta = PageMeta::new(2, 10, 25, 10);
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.from, Some(11));
        assert_eq!(meta.to, Some(20));
    }

    #[test]
    fn links_preserve_filters() {
        let filters = json!({"phone": "+62", "status": ["PENDING", "FAILED"], "page": 9});
        let filters = filters.as_object().unwrap();
        let meta = PageMeta::new(2, 10, 25, 10);
        let links = PageLinks::build("/phones", filters, &meta);

        assert_eq!(links.first, "/phones?phone=%2B62&status%5B%5D=PENDING&status%5B%5D=FAILED&per_page=10&page=1");
        assert!(links.prev.as_deref().unwrap().ends_with("page=1"));
        assert!(links.next.as_deref().unwrap().ends_with("page=3"));
        assert!(links.last.ends_with("page=3"));
    }

    #[test]
    fn single_page_has_no_neighbours() {
        let meta = PageMeta::new(1, 10, 3, 3);
        let links = PageLinks::build("", &Map::new(), &meta);
        assert_eq!(links.prev, None);
        assert_eq!(links.next, None);
        assert_eq!(links.first, "?per_page=10&page=1");
    }
}
