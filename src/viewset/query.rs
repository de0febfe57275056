//! List query parameters and their resolution into a store query.

use crate::config::ListDefaults;
use crate::store::ListFilter;

/// Raw list query string. Every field is optional and string-encoded.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub active: Option<String>,
    pub include_variants: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub filter: ListFilter,
}

impl ListQuery {
    /// Zero-based row offset of the page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n > 0)
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

fn truthy(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}

impl ListParams {
    /// Picks the known keys out of decoded query pairs; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut p = ListParams::default();
        for (k, v) in pairs {
            match k.as_str() {
                "page" => p.page = Some(v),
                "limit" => p.limit = Some(v),
                "search" => p.search = Some(v),
                "active" => p.active = Some(v),
                "include_variants" => p.include_variants = Some(v),
                _ => {}
            }
        }
        p
    }

    /// Unparsable or non-positive `page`/`limit` fall back to defaults; `limit` is capped.
    pub fn resolve(&self, defaults: ListDefaults) -> ListQuery {
        let page = positive(self.page.as_deref()).unwrap_or(1);
        let limit = positive(self.limit.as_deref())
            .unwrap_or(defaults.default_limit)
            .min(defaults.max_limit);
        ListQuery {
            page,
            limit,
            filter: ListFilter {
                search: non_empty(self.search.as_deref()).map(str::to_string),
                active: non_empty(self.active.as_deref()).map(truthy),
                expand: self.include_variants.as_deref().map(truthy).unwrap_or(false),
            },
        }
    }
}
