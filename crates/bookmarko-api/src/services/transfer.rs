//! JSON import parsing.
//!
//! An import file is a JSON array of exported bookmarks. Entries are read
//! leniently: anything that is an object with a non-blank string `url` is
//! kept, everything else is counted as skipped.

use serde_json::Value;

use bookmarko_core::CreateBookmarkRequest;

pub const INVALID_FORMAT: &str = "Invalid import format: expected an array of bookmarks";
pub const NO_VALID_ENTRIES: &str = "No valid bookmarks found in the import file";

#[derive(Debug, Default)]
pub struct ImportPlan {
    pub requests: Vec<CreateBookmarkRequest>,
    pub skipped: usize,
}

/// Turn an import document into create requests.
pub fn plan_import(document: &Value) -> Result<ImportPlan, &'static str> {
    let entries = document.as_array().ok_or(INVALID_FORMAT)?;

    let mut plan = ImportPlan::default();
    for entry in entries {
        match entry_to_request(entry) {
            Some(req) => plan.requests.push(req),
            None => plan.skipped += 1,
        }
    }

    if plan.requests.is_empty() {
        return Err(NO_VALID_ENTRIES);
    }
    Ok(plan)
}

fn entry_to_request(entry: &Value) -> Option<CreateBookmarkRequest> {
    let obj = entry.as_object()?;
    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    let url = text("url")?;
    let tags = obj.get("tags").and_then(Value::as_array).map(|tags| {
        tags.iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect::<Vec<_>>()
    });

    Some(CreateBookmarkRequest {
        title: text("title").unwrap_or_else(|| url.clone()),
        description: text("description"),
        favicon: text("favicon"),
        tags,
        metadata: obj.get("metadata").filter(|m| !m.is_null()).cloned(),
        url,
    })
}
