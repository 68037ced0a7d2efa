//! Integration-based workflow categorization

use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::entity::WorkflowSummary;

/// Catch-all category for workflows matching no table entry
pub const OTHER_CATEGORY: &str = "Other";

/// Category name and the integration substrings that qualify for it
pub type CategoryRule = (&'static str, &'static [&'static str]);

/// Fixed, ordered category table; "Other" is implicit and always last
pub const CATEGORY_TABLE: &[CategoryRule] = &[
    (
        "Communication",
        &["Slack", "Discord", "Telegram", "Mattermost", "Teams"],
    ),
    ("CRM", &["HubSpot", "Salesforce", "Pipedrive", "Copper"]),
    ("Data", &["GoogleSheets", "Airtable", "Mysql", "Postgres"]),
    ("Development", &["GitHub", "GitLab", "Jira", "Trello"]),
    ("Marketing", &["Mailchimp", "Sendinblue", "Typeform", "Webflow"]),
    ("Storage", &["GoogleDrive", "Dropbox", "OneDrive", "AWS S3"]),
];

/// Workflows grouped by category, in table order followed by "Other".
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedWorkflows(Vec<(&'static str, Vec<WorkflowSummary>)>);

impl CategorizedWorkflows {
    /// Workflows listed under `category`, if such a category exists
    pub fn get(&self, category: &str) -> Option<&[WorkflowSummary]> {
        self.0
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, workflows)| workflows.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[WorkflowSummary])> {
        self.0.iter().map(|(name, workflows)| (*name, workflows.as_slice()))
    }
}

impl Serialize for CategorizedWorkflows {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, workflows) in &self.0 {
            map.serialize_entry(name, workflows)?;
        }
        map.end()
    }
}

/// Case-insensitive substring test of an integration against a rule's services
fn matches_rule(integration_lower: &str, services: &[&str]) -> bool {
    services
        .iter()
        .any(|service| integration_lower.contains(&service.to_lowercase()))
}

/// Classify workflows by their integrations.
///
/// Each integration is tested against every category in table order and the
/// whole workflow is appended to each category it matches, once per matching
/// integration. Matching is raw substring containment, not whole-word. A
/// workflow with no match at all lands in "Other" exactly once.
pub fn categorize(workflows: &[WorkflowSummary]) -> CategorizedWorkflows {
    let mut buckets: Vec<(&'static str, Vec<WorkflowSummary>)> = CATEGORY_TABLE
        .iter()
        .map(|(name, _)| (*name, Vec::new()))
        .chain(std::iter::once((OTHER_CATEGORY, Vec::new())))
        .collect();
    let other = buckets.len() - 1;

    for workflow in workflows {
        let mut categorized = false;

        for integration in &workflow.integrations {
            let integration_lower = integration.to_lowercase();

            for (index, (_, services)) in CATEGORY_TABLE.iter().enumerate() {
                if matches_rule(&integration_lower, services) {
                    buckets[index].1.push(workflow.clone());
                    categorized = true;
                }
            }
        }

        if !categorized {
            buckets[other].1.push(workflow.clone());
        }
    }

    CategorizedWorkflows(buckets)
}

/// Every integration across the catalog, deduplicated case-sensitively and
/// sorted ascending
pub fn distinct_integrations(workflows: &[WorkflowSummary]) -> BTreeSet<String> {
    workflows
        .iter()
        .flat_map(|workflow| workflow.integrations.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(filename: &str, integrations: &[&str]) -> WorkflowSummary {
        WorkflowSummary::new(filename, filename).with_integrations(integrations.iter().copied())
    }

    fn filenames(list: Option<&[WorkflowSummary]>) -> Vec<&str> {
        list.unwrap().iter().map(|w| w.filename.as_str()).collect()
    }

    #[test]
    fn test_category_order() {
        let result = categorize(&[]);
        let names: Vec<&str> = result.names().collect();

        assert_eq!(
            names,
            vec!["Communication", "CRM", "Data", "Development", "Marketing", "Storage", "Other"]
        );
        assert!(result.iter().all(|(_, list)| list.is_empty()));
    }

    #[test]
    fn test_substring_match_case_insensitive() {
        let result = categorize(&[workflow("crm.json", &["HubSpot CRM"])]);

        assert_eq!(filenames(result.get("CRM")), vec!["crm.json"]);
        assert!(result.get("Other").unwrap().is_empty());
    }

    #[test]
    fn test_lowercase_integration_matches() {
        let result = categorize(&[workflow("pg.json", &["postgres"])]);
        assert_eq!(filenames(result.get("Data")), vec!["pg.json"]);
    }

    #[test]
    fn test_multiple_categories_duplicate() {
        let result = categorize(&[workflow("both.json", &["Slack", "GitHub"])]);

        assert_eq!(filenames(result.get("Communication")), vec!["both.json"]);
        assert_eq!(filenames(result.get("Development")), vec!["both.json"]);
        assert!(result.get("Other").unwrap().is_empty());
    }

    #[test]
    fn test_unmatched_goes_to_other_once() {
        let result = categorize(&[workflow("x.json", &["UnknownService", "AlsoUnknown"])]);

        assert_eq!(filenames(result.get("Other")), vec!["x.json"]);
        for (name, list) in result.iter() {
            if name != OTHER_CATEGORY {
                assert!(list.is_empty(), "{name} should be empty");
            }
        }
    }

    #[test]
    fn test_no_integrations_goes_to_other() {
        let result = categorize(&[workflow("bare.json", &[])]);
        assert_eq!(filenames(result.get("Other")), vec!["bare.json"]);
    }

    #[test]
    fn test_partial_match_skips_other() {
        let result = categorize(&[workflow("mixed.json", &["UnknownService", "Discord"])]);

        assert_eq!(filenames(result.get("Communication")), vec!["mixed.json"]);
        assert!(result.get("Other").unwrap().is_empty());
    }

    #[test]
    fn test_same_category_once_per_matching_integration() {
        let result = categorize(&[workflow("chat.json", &["Slack", "Discord", "Http"])]);
        assert_eq!(
            filenames(result.get("Communication")),
            vec!["chat.json", "chat.json"]
        );
    }

    #[test]
    fn test_substring_false_positive_preserved() {
        // "Teams" is a Communication service, so any name containing it matches.
        let result = categorize(&[workflow("fp.json", &["SportsTeamsApi"])]);
        assert_eq!(filenames(result.get("Communication")), vec!["fp.json"]);
    }

    #[test]
    fn test_service_with_space() {
        let result = categorize(&[workflow("s3.json", &["AWS S3 Bucket"])]);
        assert_eq!(filenames(result.get("Storage")), vec!["s3.json"]);
    }

    #[test]
    fn test_serializes_in_table_order() {
        let result = categorize(&[workflow("a.json", &["Slack"])]);
        let json = serde_json::to_string(&result).unwrap();

        let communication = json.find("\"Communication\"").unwrap();
        let crm = json.find("\"CRM\"").unwrap();
        let other = json.find("\"Other\"").unwrap();
        assert!(communication < crm && crm < other);
    }

    #[test]
    fn test_distinct_integrations_sorted_case_sensitive() {
        let workflows = [
            workflow("a.json", &["Slack", "HTTP Request", "slack"]),
            workflow("b.json", &["Airtable", "Slack"]),
        ];

        let integrations: Vec<String> = distinct_integrations(&workflows).into_iter().collect();
        assert_eq!(integrations, vec!["Airtable", "HTTP Request", "Slack", "slack"]);
    }

    #[test]
    fn test_distinct_integrations_empty() {
        assert!(distinct_integrations(&[]).is_empty());
    }
}
