//! Paged response envelope.

use crate::paging::{PageRequest, Sort};
use serde::Serialize;

/// One page of results plus the metadata clients need to navigate.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index.
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
    pub sort: Sort,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = request.size.max(1);
        let total_pages = total_elements.div_ceil(u64::from(size));
        let number = request.page;
        Page {
            number_of_elements: content.len(),
            empty: content.is_empty(),
            content,
            number,
            size: request.size,
            total_elements,
            total_pages,
            first: number == 0,
            last: u64::from(number) + 1 >= total_pages,
            sort: request.sort.clone(),
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number_of_elements: self.number_of_elements,
            first: self.first,
            last: self.last,
            empty: self.empty,
            sort: self.sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PagingConfig;

    #[test]
    fn metadata_for_middle_page() {
        let req = PageRequest::normalize(2, 2, "id", "asc", &PagingConfig::default()).unwrap();
        let page = Page::new(vec![3, 4], &req, 5);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 3);
        assert!(!page.first);
        assert!(!page.last);
        assert_eq!(page.number_of_elements, 2);
    }

    #[test]
    fn empty_result_is_first_and_last() {
        let req = PageRequest::normalize(1, 10, "id", "asc", &PagingConfig::default()).unwrap();
        let page: Page<i32> = Page::new(vec![], &req, 0);
        assert!(page.first && page.last && page.empty);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn map_keeps_metadata_and_serializes_camel_case() {
        let req = PageRequest::normalize(1, 10, "id", "desc", &PagingConfig::default()).unwrap();
        let page = Page::new(vec![1, 2], &req, 2).map(|n| n * 10);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["content"], serde_json::json!([10, 20]));
        assert_eq!(json["totalElements"], 2);
        assert_eq!(json["sort"]["direction"], "desc");
    }
}
