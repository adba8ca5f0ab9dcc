use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub owner: Option<String>,
}

/// One page of a delimited listing: pseudo-directories and the plain
/// objects that sit directly under the requested prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectListing {
    pub directories: Vec<String>,
    pub files: Vec<ObjectInfo>,
    pub next_token: Option<String>,
}

/// Everything needed to fetch (or re-fetch) one page of an object listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectQuery {
    pub bucket: String,
    pub path: String,
    pub filter: String,
    pub continuation_token: Option<String>,
    pub page: usize,
}

impl ObjectQuery {
    pub fn first_page(bucket: &str, path: &str, filter: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            path: path.to_string(),
            filter: filter.to_string(),
            continuation_token: None,
            page: 0,
        }
    }

    /// The prefix sent to the service: the current path with the filter
    /// text appended, or `None` when listing the bucket root unfiltered.
    pub fn prefix(&self) -> Option<String> {
        let prefix = format!("{}{}", self.path, self.filter);
        if prefix.is_empty() { None } else { Some(prefix) }
    }
}

pub fn format_timestamp(timestamp: Option<&DateTime<Utc>>) -> String {
    timestamp
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default()
}
