use log::debug;

use crate::core::category::CategorySet;
use crate::core::error::{FrameworkError, Result};
use crate::core::test::TestModule;

/// A module accepted by the registry, with its validated categories.
#[derive(Debug)]
pub struct RegisteredTest {
    module: TestModule,
    categories: CategorySet,
}

impl RegisteredTest {
    pub fn name(&self) -> &str {
        self.module.name()
    }

    pub fn categories(&self) -> CategorySet {
        self.categories
    }

    pub fn module(&self) -> &TestModule {
        &self.module
    }
}

/// Every compiled-in test module, kept sorted by run priority.
#[derive(Debug, Default)]
pub struct TestRegistry {
    tests: Vec<RegisteredTest>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module. Modules with equal priority keep registration order.
    ///
    /// Out-of-set category bits and duplicate names are programming
    /// errors in the module; callers should treat them as fatal.
    pub fn register(&mut self, module: TestModule) -> Result<()> {
        let categories = CategorySet::from_bits(module.flags()).ok_or_else(|| {
            FrameworkError::InvalidCategoryFlags {
                name: module.name().to_string(),
                bits: module.flags(),
            }
        })?;

        if self.find(module.name()).is_some() {
            return Err(FrameworkError::DuplicateTest(module.name().to_string()));
        }

        let position = self
            .tests
            .iter()
            .position(|t| t.module.priority() > module.priority())
            .unwrap_or(self.tests.len());

        debug!(
            "Registered test {} (priority {}, {} minor tests, categories {})",
            module.name(),
            module.priority(),
            module.minor_count(),
            categories
        );

        self.tests.insert(position, RegisteredTest { module, categories });
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&RegisteredTest> {
        self.tests.iter().find(|t| t.name() == name)
    }

    /// Registered tests matching `predicate`, in run order.
    pub fn enumerate<P>(&self, predicate: P) -> Vec<&RegisteredTest>
    where
        P: Fn(&RegisteredTest) -> bool,
    {
        self.tests.iter().filter(|t| predicate(t)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTest> {
        self.tests.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tests.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
