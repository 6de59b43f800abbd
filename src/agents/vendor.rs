//! Vendor stall and purchase rules
//!
//! A purchase is evaluated as a rule ladder in fixed priority order:
//! cure an ailment, then relieve stress, then restore energy, then a
//! luxury upgrade. Each rule is conditional on wealth and stock; the
//! first applicable rule wins.

use serde::{Deserialize, Serialize};

use crate::core::log::EventLog;
use crate::agents::villager::Villager;

pub const CURE_PRICE: u32 = 15;
pub const REMEDY_PRICE: u32 = 20;
pub const MEAL_PRICE: u32 = 5;
pub const BOOTS_PRICE: u32 = 50;

/// Stress above which a remedy is worth buying
const REMEDY_STRESS: f32 = 40.0;
/// Energy below which a meal is worth buying
const MEAL_ENERGY: f32 = 50.0;
/// Wealth at which luxury spending kicks in
const LUXURY_WEALTH: u32 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub remedies: u32,
    pub meals: u32,
    pub boots: u32,
}

impl Default for Vendor {
    fn default() -> Self {
        Self {
            remedies: 50,
            meals: 100,
            boots: 10,
        }
    }
}

impl Vendor {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Run the purchase ladder for one nearby customer
pub fn attend_customer(vendor: &mut Vendor, name: &str, v: &mut Villager, log: &mut EventLog) {
    // 1. Cure an ailment
    if v.ailment.is_some() && v.wealth >= CURE_PRICE {
        v.wealth -= CURE_PRICE;
        v.ailment = None;
        log.push(format!("SHOP: {name} bought medicine and was cured (-{CURE_PRICE}G)."));
        return;
    }

    // 2. Relieve stress
    if v.stress > REMEDY_STRESS && v.wealth >= REMEDY_PRICE && vendor.remedies > 0 {
        v.wealth -= REMEDY_PRICE;
        vendor.remedies -= 1;
        v.stress = 0.0;
        log.push(format!("SHOP: {name} bought a calming remedy (-{REMEDY_PRICE}G)."));
        return;
    }

    // 3. Restore energy
    if v.energy < MEAL_ENERGY && v.wealth >= MEAL_PRICE && vendor.meals > 0 {
        v.wealth -= MEAL_PRICE;
        vendor.meals -= 1;
        v.energy = 100.0;
        log.push(format!("SHOP: {name} bought a hot meal (-{MEAL_PRICE}G)."));
        return;
    }

    // 4. Luxury upgrade
    if v.wealth >= LUXURY_WEALTH && vendor.boots > 0 {
        v.wealth -= BOOTS_PRICE;
        vendor.boots -= 1;
        v.base_speed += 1.0;
        v.add_journal_entry("Treated myself to a pair of fine boots.");
        log.push(format!("SHOP: {name} bought new boots! (+speed)"));
    }
}
