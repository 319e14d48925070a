//! Paged collection results for list and search operations.

use crate::resource::context::RequestContext;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One page of entities plus the metadata needed to build paging links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    /// Entities on this page, already rendered at the requested representation
    pub results: Vec<Value>,
    /// Offset of the first entity on this page
    pub offset: usize,
    /// Page size that was requested
    pub limit: usize,
    /// Whether more entities exist after this page
    pub has_more: bool,
    /// Total number of matching entities, when the client asked for it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

impl PageResult {
    /// Wrap a page that the handler already sliced itself.
    pub fn already_paged(results: Vec<Value>, context: &RequestContext, has_more: bool) -> Self {
        Self {
            results,
            offset: context.offset(),
            limit: context.limit(),
            has_more,
            total_count: None,
        }
    }

    /// Slice a complete result set according to the context's paging window.
    ///
    /// Reports a total only when the context asked for one.
    pub fn paginate(all: Vec<Value>, context: &RequestContext) -> Self {
        let total = all.len();
        let offset = context.offset();
        let limit = context.limit();
        let results: Vec<Value> = all.into_iter().skip(offset).take(limit).collect();
        let has_more = offset.saturating_add(results.len()) < total;

        Self {
            results,
            offset,
            limit,
            has_more,
            total_count: context.total_count().then_some(total),
        }
    }

    pub fn with_total_count(mut self, total: usize) -> Self {
        self.total_count = Some(total);
        self
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Offset of the following page, if any.
    pub fn next_offset(&self) -> Option<usize> {
        self.has_more.then(|| self.offset + self.limit)
    }

    /// Offset of the preceding page, if any.
    pub fn previous_offset(&self) -> Option<usize> {
        (self.offset > 0).then(|| self.offset.saturating_sub(self.limit))
    }

    /// Render the page as `{"results": [...], "links": [...]}`.
    ///
    /// `base_uri` is the collection URI without paging parameters; links are
    /// omitted when it is `None` or when there is no adjacent page.
    pub fn to_json(&self, base_uri: Option<&str>) -> Value {
        let mut body = json!({ "results": self.results });

        if let Some(base) = base_uri {
            let separator = if base.contains('?') { '&' } else { '?' };
            let link = |rel: &str, offset: usize| {
                json!({
                    "rel": rel,
                    "uri": format!(
                        "{}{}limit={}&startIndex={}",
                        base, separator, self.limit, offset
                    ),
                })
            };

            let mut links = Vec::new();
            if let Some(previous) = self.previous_offset() {
                links.push(link("prev", previous));
            }
            if let Some(next) = self.next_offset() {
                links.push(link("next", next));
            }
            if !links.is_empty() {
                body["links"] = Value::Array(links);
            }
        }

        if let Some(total) = self.total_count {
            body["totalCount"] = json!(total);
        }
        body
    }
}
