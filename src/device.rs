//! Device calibration for the cost estimator.
//!
//! A [`DeviceBudget`] is the host's tolerance for diff and animation work.
//! Budgets are injected by the caller; [`BudgetTable::builtin`] carries a
//! table of historical single-core benchmark scores for callers that only
//! know the device class.

use std::fmt;

use compact_str::CompactString;
use rustc_hash::FxHashMap;

/// Prefix the host adds to a device class when running in a simulator
const SIMULATOR_PREFIX: &str = "Simulator ";

/// Scalar tolerance for diff/animation cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceBudget(u32);

impl DeviceBudget {
    /// Mid-range fallback for unknown device classes
    pub const DEFAULT: Self = Self(2406);

    #[inline]
    pub const fn new(score: u32) -> Self {
        Self(score)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for DeviceBudget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DeviceBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Device class identifier, e.g. `"iPhone SE"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceClass(CompactString);

impl DeviceClass {
    pub fn new(name: &str) -> Self {
        Self(CompactString::new(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Class with a simulator wrapper removed
    fn unwrapped(&self) -> &str {
        self.0.strip_prefix(SIMULATOR_PREFIX).unwrap_or(self.0.as_str())
    }
}

impl From<&str> for DeviceClass {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lookup table from device class to budget
#[derive(Debug, Clone)]
pub struct BudgetTable {
    scores: FxHashMap<DeviceClass, DeviceBudget>,
    fallback: DeviceBudget,
}

impl Default for BudgetTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BudgetTable {
    /// Empty table; every lookup yields `fallback`.
    pub fn new(fallback: DeviceBudget) -> Self {
        Self {
            scores: FxHashMap::default(),
            fallback,
        }
    }

    /// Historical benchmark scores of iPod, iPhone and iPad models.
    pub fn builtin() -> Self {
        const SCORES: &[(&str, u32)] = &[
            ("iPod touch (5th generation)", 280),
            ("iPod touch (6th generation)", 1315),
            ("iPhone 4s", 282),
            ("iPhone 5", 727),
            ("iPhone 5c", 716),
            ("iPhone 5s", 1204),
            ("iPhone 6", 1465),
            ("iPhone 6 Plus", 1475),
            ("iPhone 6s", 2371),
            ("iPhone 6s Plus", 2397),
            ("iPhone 7", 3298),
            ("iPhone 7 Plus", 3308),
            ("iPhone SE", 2406),
            ("iPhone 8", 4217),
            ("iPhone 8 Plus", 4216),
            ("iPhone X", 4205),
            ("iPad 2", 330),
            ("iPad (3rd generation)", 326),
            ("iPad (4th generation)", 803),
            ("iPad (5th generation)", 2523),
            ("iPad Air", 1308),
            ("iPad Air 2", 1783),
            ("iPad Mini", 326),
            ("iPad Mini 2", 1233),
            ("iPad Mini 3", 1231),
            ("iPad Mini 4", 1632),
            ("iPad Pro (9.7-inch)", 2935),
            ("iPad Pro (12.9-inch)", 3012),
            ("iPad Pro (12.9-inch) (2nd generation)", 3903),
            ("iPad Pro (10.5-inch)", 3908),
        ];

        SCORES
            .iter()
            .fold(Self::new(DeviceBudget::DEFAULT), |table, &(name, score)| {
                table.with(name, DeviceBudget::new(score))
            })
    }

    /// Add or replace one entry.
    pub fn with(mut self, class: impl Into<DeviceClass>, budget: DeviceBudget) -> Self {
        self.scores.insert(class.into(), budget);
        self
    }

    /// Budget for a device class, falling back for unknown classes.
    ///
    /// A simulator reports the budget of the device it simulates.
    ///
    /// ```
    /// use tola_reconcile::{BudgetTable, DeviceBudget, DeviceClass};
    ///
    /// let table = BudgetTable::builtin();
    /// assert_eq!(table.lookup(&DeviceClass::new("iPhone 8")), DeviceBudget::new(4217));
    /// assert_eq!(table.lookup(&DeviceClass::new("Simulator iPhone 8")), DeviceBudget::new(4217));
    /// assert_eq!(table.lookup(&DeviceClass::new("Toaster")), DeviceBudget::DEFAULT);
    /// ```
    pub fn lookup(&self, class: &DeviceClass) -> DeviceBudget {
        self.scores
            .get(class)
            .or_else(|| self.scores.get(&DeviceClass::new(class.unwrapped())))
            .copied()
            .unwrap_or(self.fallback)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
