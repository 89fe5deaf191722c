//! Typical power ratings for common household appliances.

use super::Appliance;

/// Typical average draw (kW) while running.
pub const DEFAULT_POWER_KW: &[(&str, f64)] = &[
    ("Refrigerator", 1.2),
    ("Washing Machine", 0.5),
    ("Dryer", 3.0),
    ("Dishwasher", 1.5),
    ("Microwave", 1.0),
    ("Oven", 2.3),
    ("Toaster", 0.8),
    ("Coffee Maker", 0.9),
    ("Television", 0.2),
    ("Computer", 0.1),
    ("Air Conditioner", 3.5),
    ("Heater", 2.0),
    ("Vacuum Cleaner", 1.4),
    ("Iron", 1.8),
    ("Lighting", 0.6),
];

/// Looks up the typical power rating of an appliance (case-insensitive).
pub fn default_power(name: &str) -> Option<f64> {
    DEFAULT_POWER_KW
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name.trim()))
        .map(|&(_, power)| power)
}

/// A small ready-made appliance set for demos and smoke tests.
pub fn demo_appliances() -> Vec<Appliance> {
    vec![
        Appliance::new("Washer", 0.5, 2),
        Appliance::new("Dryer", 1.0, 1),
        Appliance::new("Dishwasher", 1.2, 2),
    ]
}
