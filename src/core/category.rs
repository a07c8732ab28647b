use std::fmt;
use serde::{Serialize, Deserialize};

/// When and how a test module should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Batch,
    Interactive,
    BatchExperimental,
    InteractiveExperimental,
    PowerStates,
    Utils,
}

impl Category {
    /// Every category, in listing order.
    pub const ALL: [Category; 6] = [
        Category::Batch,
        Category::Interactive,
        Category::BatchExperimental,
        Category::InteractiveExperimental,
        Category::PowerStates,
        Category::Utils,
    ];

    /// The bit this category occupies in a raw flags word.
    pub const fn bit(self) -> u32 {
        match self {
            Category::Batch => 0x01,
            Category::Interactive => 0x02,
            Category::BatchExperimental => 0x04,
            Category::InteractiveExperimental => 0x08,
            Category::PowerStates => 0x10,
            Category::Utils => 0x20,
        }
    }

    /// Heading used when listing tests.
    pub fn title(self) -> &'static str {
        match self {
            Category::Batch => "Batch tests",
            Category::Interactive => "Interactive tests",
            Category::BatchExperimental => "Batch Experimental tests",
            Category::InteractiveExperimental => "Interactive Experimental tests",
            Category::PowerStates => "Power States tests",
            Category::Utils => "Utilities",
        }
    }
}

/// Raw flag bits accepted at registration.
pub const FLAG_BATCH: u32 = Category::Batch.bit();
pub const FLAG_INTERACTIVE: u32 = Category::Interactive.bit();
pub const FLAG_BATCH_EXPERIMENTAL: u32 = Category::BatchExperimental.bit();
pub const FLAG_INTERACTIVE_EXPERIMENTAL: u32 = Category::InteractiveExperimental.bit();
pub const FLAG_POWER_STATES: u32 = Category::PowerStates.bit();
pub const FLAG_UTILS: u32 = Category::Utils.bit();

/// Small fixed-size set of [`Category`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CategorySet(u32);

impl CategorySet {
    pub const EMPTY: CategorySet = CategorySet(0);
    pub const ALL: CategorySet = CategorySet(
        FLAG_BATCH
            | FLAG_INTERACTIVE
            | FLAG_BATCH_EXPERIMENTAL
            | FLAG_INTERACTIVE_EXPERIMENTAL
            | FLAG_POWER_STATES
            | FLAG_UTILS,
    );

    /// Validate a raw flags word. Returns `None` if any bit falls outside
    /// the known categories.
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::ALL.0 != 0 {
            None
        } else {
            Some(CategorySet(bits))
        }
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn only(category: Category) -> Self {
        CategorySet(category.bit())
    }

    pub fn with(self, category: Category) -> Self {
        CategorySet(self.0 | category.bit())
    }

    pub fn contains(self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn intersects(self, other: CategorySet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Modules carrying the utility bit do not produce a test summary.
    pub fn is_utility(self) -> bool {
        self.contains(Category::Utils)
    }

    /// Interactive modules wait on the operator, so they get no progress meter.
    pub fn is_interactive(self) -> bool {
        self.contains(Category::Interactive) || self.contains(Category::InteractiveExperimental)
    }

    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        iter.into_iter().fold(CategorySet::EMPTY, CategorySet::with)
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|c| format!("{:?}", c)).collect();
        write!(f, "{}", names.join("|"))
    }
}
