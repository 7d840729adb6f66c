//! Pricing table: named packages of time for money

use kiosk_api::PackageView;

/// A purchasable block of time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub label: String,
    pub seconds: u64,
    pub cost: u64,
}

impl Package {
    pub fn new(label: impl Into<String>, seconds: u64, cost: u64) -> Self {
        Self {
            label: label.into(),
            seconds,
            cost,
        }
    }

    pub fn to_view(&self) -> PackageView {
        PackageView {
            label: self.label.clone(),
            seconds: self.seconds,
            cost: self.cost,
        }
    }
}

/// Static mapping of package labels to `(seconds, cost)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingTable {
    packages: Vec<Package>,
}

impl PricingTable {
    pub fn new(packages: Vec<Package>) -> Self {
        Self { packages }
    }

    /// Look up a package by label. Surrounding whitespace is ignored.
    pub fn get(&self, label: &str) -> Option<&Package> {
        let label = label.trim();
        self.packages.iter().find(|p| p.label == label)
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn views(&self) -> Vec<PackageView> {
        self.packages.iter().map(Package::to_view).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::new(vec![
            Package::new("35 minutes", 2100, 1000),
            Package::new("1h20m", 4800, 2000),
            Package::new("2 hours", 7200, 3000),
            Package::new("2h40m", 9600, 4000),
            Package::new("3h30m", 12600, 5000),
        ])
    }
}
