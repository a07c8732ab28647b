use log::{debug, info};

use crate::core::category::{Category, CategorySet};
use crate::core::error::{FrameworkError, Result};
use crate::core::registry::{RegisteredTest, TestRegistry};

/// What the user asked to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub explicit: Vec<String>,
    pub skip: Vec<String>,
    /// `None` means the user gave no category; batch tests run.
    pub categories: Option<CategorySet>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tests<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn skip<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn categories(mut self, categories: CategorySet) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Mask applied when no explicit names are given.
    pub fn effective_categories(&self) -> CategorySet {
        match self.categories {
            Some(mask) if !mask.is_empty() => mask,
            _ => CategorySet::only(Category::Batch),
        }
    }
}

/// Resolve the ordered run-list.
///
/// Unknown names, in either list, fail the whole selection so nothing runs.
/// The skip list wins over an explicitly named test.
pub fn resolve<'r>(registry: &'r TestRegistry, selection: &Selection) -> Result<Vec<&'r RegisteredTest>> {
    let mut skipped: Vec<&RegisteredTest> = Vec::with_capacity(selection.skip.len());
    for name in &selection.skip {
        let test = registry
            .find(name)
            .ok_or_else(|| FrameworkError::UnknownSkipTest(name.clone()))?;
        skipped.push(test);
    }

    let is_skipped = |test: &RegisteredTest| skipped.iter().any(|s| std::ptr::eq(*s, test));

    if !selection.explicit.is_empty() {
        let mut run_list = Vec::with_capacity(selection.explicit.len());
        for name in &selection.explicit {
            let test = registry
                .find(name)
                .ok_or_else(|| FrameworkError::UnknownTest(name.clone()))?;
            if is_skipped(test) {
                info!("Skipping test {} as requested", name);
            } else {
                run_list.push(test);
            }
        }
        return Ok(run_list);
    }

    let mask = selection.effective_categories();
    debug!("Selecting tests in categories {}", mask);

    Ok(registry.enumerate(|t| t.categories().intersects(mask) && !is_skipped(t)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::{FLAG_BATCH, FLAG_INTERACTIVE, FLAG_POWER_STATES};
    use crate::core::test::{priority, TestModule};

    fn registry() -> TestRegistry {
        let mut registry = TestRegistry::new();
        registry.register(TestModule::new("acpi", FLAG_BATCH).with_priority(priority::EARLY)).unwrap();
        registry.register(TestModule::new("hpet", FLAG_BATCH)).unwrap();
        registry.register(TestModule::new("lid", FLAG_INTERACTIVE)).unwrap();
        registry.register(TestModule::new("s3", FLAG_POWER_STATES).with_priority(priority::LATE)).unwrap();
        registry
    }

    fn names(list: &[&RegisteredTest]) -> Vec<String> {
        list.iter().map(|t| t.name().to_string()).collect()
    }

    #[test]
    fn test_default_is_batch() {
        let registry = registry();
        let list = resolve(&registry, &Selection::new()).unwrap();
        assert_eq!(names(&list), vec!["acpi", "hpet"]);
    }

    #[test]
    fn test_category_mask() {
        let registry = registry();
        let mask = CategorySet::only(Category::PowerStates).with(Category::Interactive);
        let list = resolve(&registry, &Selection::new().categories(mask)).unwrap();
        assert_eq!(names(&list), vec!["lid", "s3"]);
    }

    #[test]
    fn test_mask_matching_nothing() {
        let registry = registry();
        let selection = Selection::new().categories(CategorySet::only(Category::Utils));
        assert!(resolve(&registry, &selection).unwrap().is_empty());
    }

    #[test]
    fn test_explicit_keeps_caller_order() {
        let registry = registry();
        let list = resolve(&registry, &Selection::new().tests(["s3", "lid", "acpi"])).unwrap();
        assert_eq!(names(&list), vec!["s3", "lid", "acpi"]);
    }

    #[test]
    fn test_skip_wins_over_explicit() {
        let registry = registry();
        let selection = Selection::new().tests(["hpet", "acpi"]).skip(["hpet"]);
        let list = resolve(&registry, &selection).unwrap();
        assert_eq!(names(&list), vec!["acpi"]);
    }

    #[test]
    fn test_skip_in_category_run() {
        let registry = registry();
        let list = resolve(&registry, &Selection::new().skip(["acpi"])).unwrap();
        assert_eq!(names(&list), vec!["hpet"]);
    }

    #[test]
    fn test_unknown_explicit_name() {
        let registry = registry();
        let err = resolve(&registry, &Selection::new().tests(["acpi", "bogus"])).unwrap_err();
        assert!(matches!(err, FrameworkError::UnknownTest(name) if name == "bogus"));
    }

    #[test]
    fn test_unknown_skip_name() {
        let registry = registry();
        let err = resolve(&registry, &Selection::new().skip(["bogus"])).unwrap_err();
        assert!(matches!(err, FrameworkError::UnknownSkipTest(name) if name == "bogus"));
    }

    #[test]
    fn test_empty_mask_falls_back_to_batch() {
        let selection = Selection::new().categories(CategorySet::EMPTY);
        assert_eq!(selection.effective_categories(), CategorySet::only(Category::Batch));
    }
}
