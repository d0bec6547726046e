//! Changelog generation from Jira fix versions.

use crate::clients::JiraClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PAGE_SIZE: u32 = 100;

/// One changelog line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Issue key, e.g. NEXT-1234
    pub key: String,
    /// Issue title
    pub summary: String,
    /// Issue type, e.g. Bug
    pub issue_type: String,
}

/// Collects resolved issues for a version
#[derive(Debug, Clone)]
pub struct ChangelogService {
    jira: JiraClient,
    project_key: String,
}

impl ChangelogService {
    /// Create a service querying `project_key` through `jira`
    pub fn new(jira: JiraClient, project_key: impl Into<String>) -> Self {
        Self {
            jira,
            project_key: project_key.into(),
        }
    }

    /// JQL selecting the issues fixed in `version`
    pub fn jql(&self, version: &str) -> String {
        format!(
            "project = {} AND fixVersion = \"{}\" ORDER BY key ASC",
            self.project_key,
            version.replace('"', "\\\"")
        )
    }

    /// Fetch all issues fixed in `version`, sorted by issue number
    pub async fn get_changelog(&self, version: &str) -> Result<Vec<ChangelogEntry>> {
        let jql = self.jql(version);
        let mut entries = Vec::new();
        let mut start_at = 0;

        loop {
            let page = self.jira.search(&jql, start_at, PAGE_SIZE).await?;
            let fetched = page.issues.len() as u32;

            entries.extend(page.issues.into_iter().map(|issue| ChangelogEntry {
                key: issue.key,
                summary: issue.fields.summary.trim().to_string(),
                issue_type: issue
                    .fields
                    .issuetype
                    .map(|t| t.name)
                    .unwrap_or_else(|| "Other".to_string()),
            }));

            start_at += fetched;
            if fetched == 0 || start_at >= page.total {
                break;
            }
        }

        log::info!("Collected {} changelog entries for {}", entries.len(), version);
        sort_entries(&mut entries);
        Ok(entries)
    }
}

/// Sort by project key, then numerically by issue number
pub fn sort_entries(entries: &mut [ChangelogEntry]) {
    entries.sort_by(|a, b| issue_order(&a.key).cmp(&issue_order(&b.key)));
}

fn issue_order(key: &str) -> (String, u64, String) {
    match key.rsplit_once('-') {
        Some((project, number)) => match number.parse() {
            Ok(n) => (project.to_string(), n, String::new()),
            Err(_) => (project.to_string(), u64::MAX, number.to_string()),
        },
        None => (key.to_string(), u64::MAX, String::new()),
    }
}

/// Render entries as Markdown grouped by issue type
pub fn render_markdown(version: &str, entries: &[ChangelogEntry]) -> String {
    let mut out = format!("# {version}\n");

    if entries.is_empty() {
        out.push_str("\nNo changes.\n");
        return out;
    }

    let mut groups: BTreeMap<&str, Vec<&ChangelogEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.issue_type.as_str()).or_default().push(entry);
    }

    for (issue_type, items) in groups {
        out.push_str(&format!("\n## {issue_type}\n\n"));
        for item in items {
            out.push_str(&format!("* {} - {}\n", item.key, item.summary));
        }
    }

    out
}
