use std::collections::HashSet;
use std::fmt;

use crate::core::category::{Category, CategorySet};
use crate::core::registry::TestRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub description: String,
    pub minor_tests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: Category,
    pub entries: Vec<ListingEntry>,
}

/// Registered tests grouped by category, sorted by name within each group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestListing {
    pub full: bool,
    pub groups: Vec<CategoryGroup>,
}

impl TestListing {
    /// Number of minor tests over all listed modules. A module listed under
    /// several categories is counted once.
    pub fn total_minor_tests(&self) -> usize {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .flat_map(|g| g.entries.iter())
            .filter(|e| seen.insert(e.name.as_str()))
            .map(|e| e.minor_tests.len())
            .sum()
    }
}

/// Build a listing. With a mask only those categories are shown.
pub fn list_tests(registry: &TestRegistry, full: bool, mask: Option<CategorySet>) -> TestListing {
    let mask = mask.filter(|m| !m.is_empty()).unwrap_or(CategorySet::ALL);

    let groups = Category::ALL
        .into_iter()
        .filter(|c| mask.contains(*c))
        .filter_map(|category| {
            let mut entries: Vec<ListingEntry> = registry
                .enumerate(|t| t.categories().contains(category))
                .into_iter()
                .map(|t| ListingEntry {
                    name: t.name().to_string(),
                    description: t.module().description().to_string(),
                    minor_tests: t.module().minor_tests().iter().map(|m| m.name().to_string()).collect(),
                })
                .collect();
            if entries.is_empty() {
                return None;
            }
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Some(CategoryGroup { category, entries })
        })
        .collect();

    TestListing { full, groups }
}

impl fmt::Display for TestListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", group.category.title())?;

            for entry in &group.entries {
                if self.full {
                    let n = entry.minor_tests.len();
                    writeln!(f, " {:<13.13} ({} test{}):", entry.name, n, if n == 1 { "" } else { "s" })?;
                    for minor in &entry.minor_tests {
                        writeln!(f, "  {}", minor)?;
                    }
                } else {
                    writeln!(f, " {:<13.13} {}", entry.name, entry.description)?;
                }
            }
        }

        if self.full {
            writeln!(f, "\nTotal of {} tests", self.total_minor_tests())?;
        }
        Ok(())
    }
}
