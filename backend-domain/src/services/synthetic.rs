use std::collections::BTreeMap;

use chrono::{Duration, FixedOffset, NaiveDateTime, TimeZone};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entities::TransactionCore;
use crate::services::geo::haversine_km;

pub const STREAM_BASE_FRAUD_PROBABILITY: f64 = 0.01;
pub const DATASET_FRAUD_PROBABILITY: f64 = 0.03;
pub const MAX_FRAUD_PROBABILITY: f64 = 0.5;
pub const HIGH_RISK_CATEGORIES: [&str; 2] = ["Electronics", "Appliances"];
pub const HIGH_RISK_CATEGORY_MULTIPLIER: f64 = 1.5;
pub const DISTANCE_THRESHOLD_KM: f64 = 5.0;
pub const DISTANCE_MULTIPLIER: f64 = 1.2;
pub const LOOKBACK_DAYS: i64 = 365;

/// Value lists used to synthesize transactions. Every field falls back to
/// the built-in list when missing from an override file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub merchants: Vec<String>,
    pub categories: Vec<String>,
    pub genders: Vec<String>,
    pub cities: Vec<String>,
    pub provinces: Vec<String>,
    pub jobs: Vec<String>,
    pub merchant_categories: BTreeMap<String, String>,
    pub city_provinces: BTreeMap<String, String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            merchants: owned(&[
                "Amazon",
                "Pick n Pay",
                "N Richards",
                "Choppies",
                "Savemore",
                "eBay",
                "Trade Center",
                "Spar",
                "7 Rings",
                "Museyamwa",
                "KFC",
                "Chicken Inn",
                "QV Pharmacy",
                "Total",
                "Zuva",
                "Indrive",
                "Uber",
                "Nike",
                "Adidas",
                "Under Armour",
                "Push Athletics",
                "Pfeka",
                "Greenwood Pharmacy",
                "Chicken Slice",
                "Foodbox",
                "Thuli",
                "Engen",
                "Kombi",
                "MedOrange",
            ]),
            categories: owned(&[
                "Food",
                "Fuel",
                "Clothing",
                "Utilities",
                "Medical",
                "Toys",
                "Appliances",
                "Electronics",
                "Entertainment",
                "Retail",
                "Other",
            ]),
            genders: owned(&["M", "F"]),
            cities: owned(&[
                "Harare",
                "Bulawayo",
                "Mutare",
                "Gweru",
                "Masvingo",
                "Chinhoyi",
                "Kwekwe",
                "Marondera",
                "Chivhu",
                "Zvishavane",
                "Kariba",
                "Shurugwi",
                "Karoi",
                "Beit Bridge",
                "Mhangura",
                "Hwange",
                "Vic Falls",
                "Lupane",
            ]),
            provinces: owned(&[
                "Harare",
                "Bulawayo",
                "Manicaland",
                "Mashonaland",
                "Matabeleland",
                "Masvingo",
                "Midlands",
                "Mashonaland West",
                "Mashonaland East",
                "Matabeleland North",
                "Matabeleland South",
            ]),
            jobs: owned(&[
                "Engineer",
                "Doctor",
                "Teacher",
                "Lawyer",
                "Nurse",
                "Pilot",
                "Farmer",
                "Artist",
                "Musician",
                "Athlete",
                "IT Support",
                "Actuary",
                "Politician",
                "Soldier",
                "Mechanic",
                "Hwindi",
                "Driver",
                "Lecturer",
                "Accountant",
                "Architect",
                "Pharmacist",
                "Veterinarian",
                "Data Scientist",
                "Environmental Consultant",
                "Research Scientist",
                "Social Worker",
                "Chef",
                "Tour Guide",
                "Mining Geologist",
                "Customs Officer",
                "Banker",
                "Statistician",
                "Auditor",
                "Physiotherapist",
                "Radiographer",
                "Forensic Analyst",
                "Insurance Broker",
                "Microbiologist",
                "Human Resource Manager",
                "Marketing Specialist",
                "Graphic Designer",
                "Event Planner",
                "Real Estate Agent",
                "Plumber",
                "Electrician",
                "Interior Designer",
                "Civil Servant",
                "Other",
            ]),
            merchant_categories: owned_map(&[
                ("Amazon", "Electronics"),
                ("eBay", "Other"),
                ("Pick n Pay", "Food"),
                ("Choppies", "Food"),
                ("Savemore", "Food"),
                ("Spar", "Food"),
                ("QV Pharmacy", "Medical"),
                ("Greenwood Pharmacy", "Medical"),
                ("MedOrange", "Medical"),
                ("KFC", "Food"),
                ("Chicken Inn", "Food"),
                ("Chicken Slice", "Food"),
                ("Foodbox", "Food"),
                ("Total", "Fuel"),
                ("Zuva", "Fuel"),
                ("Thuli", "Fuel"),
                ("Engen", "Fuel"),
                ("Indrive", "Other"),
                ("Uber", "Other"),
                ("Kombi", "Other"),
                ("Nike", "Clothing"),
                ("Adidas", "Clothing"),
                ("Under Armour", "Clothing"),
                ("Push Athletics", "Clothing"),
                ("Pfeka", "Clothing"),
                ("N Richards", "Other"),
                ("7 Rings", "Other"),
                ("Museyamwa", "Other"),
                ("Trade Center", "Other"),
            ]),
            city_provinces: owned_map(&[
                ("Harare", "Harare"),
                ("Bulawayo", "Bulawayo"),
                ("Mutare", "Manicaland"),
                ("Gweru", "Midlands"),
                ("Masvingo", "Masvingo"),
                ("Chinhoyi", "Mashonaland West"),
                ("Kwekwe", "Midlands"),
                ("Marondera", "Mashonaland East"),
                ("Chivhu", "Mashonaland East"),
                ("Zvishavane", "Midlands"),
                ("Kariba", "Mashonaland West"),
                ("Shurugwi", "Midlands"),
                ("Karoi", "Mashonaland West"),
                ("Beit Bridge", "Matabeleland South"),
                ("Mhangura", "Mashonaland West"),
                ("Hwange", "Matabeleland North"),
                ("Vic Falls", "Matabeleland North"),
                ("Lupane", "Matabeleland North"),
            ]),
        }
    }
}

impl Catalog {
    pub fn validate(&self) -> anyhow::Result<()> {
        let lists = [
            ("merchants", &self.merchants),
            ("categories", &self.categories),
            ("genders", &self.genders),
            ("cities", &self.cities),
            ("provinces", &self.provinces),
            ("jobs", &self.jobs),
        ];
        for (name, values) in lists {
            if values.iter().all(|value| value.trim().is_empty()) {
                anyhow::bail!("catalog list '{}' must not be empty", name);
            }
        }
        Ok(())
    }

    /// Fills in mappings for merchants and cities the override file left
    /// unmapped by drawing a category or province at random.
    pub fn complete_mappings<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for merchant in &self.merchants {
            if !self.merchant_categories.contains_key(merchant) {
                if let Some(category) = self.categories.choose(rng) {
                    self.merchant_categories
                        .insert(merchant.clone(), category.clone());
                }
            }
        }
        for city in &self.cities {
            if !self.city_provinces.contains_key(city) {
                if let Some(province) = self.provinces.choose(rng) {
                    self.city_provinces.insert(city.clone(), province.clone());
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntheticProfile {
    /// Independent draws with a distance/category weighted label.
    Stream,
    /// Consistent merchant/category and city/province with a flat label rate.
    Dataset,
}

impl SyntheticProfile {
    pub fn latitude_range(&self) -> (f64, f64) {
        match self {
            SyntheticProfile::Stream => (-22.0, -14.5),
            SyntheticProfile::Dataset => (-21.0, -15.0),
        }
    }

    pub fn longitude_range(&self) -> (f64, f64) {
        match self {
            SyntheticProfile::Stream => (25.5, 33.0),
            SyntheticProfile::Dataset => (25.0, 35.0),
        }
    }
}

/// Label probability used by the stream profile.
pub fn heuristic_fraud_probability(category: &str, distance_km: f64) -> f64 {
    let category_multiplier = if HIGH_RISK_CATEGORIES.contains(&category) {
        HIGH_RISK_CATEGORY_MULTIPLIER
    } else {
        1.0
    };
    let distance_multiplier = if distance_km > DISTANCE_THRESHOLD_KM {
        DISTANCE_MULTIPLIER
    } else {
        1.0
    };
    (STREAM_BASE_FRAUD_PROBABILITY * category_multiplier * distance_multiplier)
        .min(MAX_FRAUD_PROBABILITY)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticTransaction {
    pub core: TransactionCore,
    /// Local wall-clock time in the generator's offset.
    pub processed_at: NaiveDateTime,
    pub is_fraud: bool,
}

impl SyntheticTransaction {
    pub fn processed_at_text(&self) -> String {
        self.processed_at.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

pub struct SyntheticGenerator<R: Rng> {
    catalog: Catalog,
    profile: SyntheticProfile,
    offset: FixedOffset,
    fraud_probability: f64,
    now: NaiveDateTime,
    rng: R,
}

impl<R: Rng> SyntheticGenerator<R> {
    pub fn new(
        mut catalog: Catalog,
        profile: SyntheticProfile,
        offset: FixedOffset,
        now: NaiveDateTime,
        mut rng: R,
    ) -> Self {
        catalog.complete_mappings(&mut rng);
        Self {
            catalog,
            profile,
            offset,
            fraud_probability: DATASET_FRAUD_PROBABILITY,
            now,
            rng,
        }
    }

    /// Overrides the flat label rate of the dataset profile.
    pub fn with_fraud_probability(mut self, probability: f64) -> Self {
        self.fraud_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn generate(&mut self) -> SyntheticTransaction {
        match self.profile {
            SyntheticProfile::Stream => self.generate_stream(),
            SyntheticProfile::Dataset => self.generate_dataset(),
        }
    }

    pub fn generate_batch(&mut self, count: usize) -> Vec<SyntheticTransaction> {
        (0..count).map(|_| self.generate()).collect()
    }

    fn generate_stream(&mut self) -> SyntheticTransaction {
        let merchant = self.pick(|catalog| &catalog.merchants);
        let category = self.pick(|catalog| &catalog.categories);
        let gender = self.pick(|catalog| &catalog.genders);
        let city = self.pick(|catalog| &catalog.cities);
        let province = self.pick(|catalog| &catalog.provinces);
        let (latitude, longitude) = self.coordinates();
        let (merch_latitude, merch_longitude) = self.coordinates();
        let distance = haversine_km(latitude, longitude, merch_latitude, merch_longitude);
        let is_fraud = self.rng.gen::<f64>() < heuristic_fraud_probability(&category, distance);
        let amt = self.amount(is_fraud);
        let job = self.pick(|catalog| &catalog.jobs);
        let city_pop = self.rng.gen_range(10_000..=1_000_000);
        let processed_at = self.timestamp();
        let unix_time = self.unix_time(&processed_at);
        SyntheticTransaction {
            core: TransactionCore {
                merchant,
                category,
                amt,
                gender,
                city,
                province,
                latitude,
                longitude,
                city_pop,
                job,
                unix_time,
                merch_latitude,
                merch_longitude,
            },
            processed_at,
            is_fraud,
        }
    }

    fn generate_dataset(&mut self) -> SyntheticTransaction {
        let is_fraud = self.rng.gen::<f64>() < self.fraud_probability;
        let merchant = self.pick(|catalog| &catalog.merchants);
        let category = self
            .catalog
            .merchant_categories
            .get(&merchant)
            .cloned()
            .unwrap_or_else(|| "Other".to_string());
        let amt = self.amount(is_fraud);
        let gender = self.pick(|catalog| &catalog.genders);
        let city = self.pick(|catalog| &catalog.cities);
        let province = self
            .catalog
            .city_provinces
            .get(&city)
            .cloned()
            .unwrap_or_else(|| city.clone());
        let (latitude, longitude) = self.coordinates();
        let city_pop = self.rng.gen_range(10_000..=1_000_000);
        let job = self.pick(|catalog| &catalog.jobs);
        let processed_at = self.timestamp();
        let (merch_latitude, merch_longitude) = self.coordinates();
        let unix_time = self.unix_time(&processed_at);
        SyntheticTransaction {
            core: TransactionCore {
                merchant,
                category,
                amt,
                gender,
                city,
                province,
                latitude,
                longitude,
                city_pop,
                job,
                unix_time,
                merch_latitude,
                merch_longitude,
            },
            processed_at,
            is_fraud,
        }
    }

    fn pick(&mut self, list: impl Fn(&Catalog) -> &Vec<String>) -> String {
        list(&self.catalog)
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }

    fn coordinates(&mut self) -> (f64, f64) {
        let (lat_min, lat_max) = self.profile.latitude_range();
        let (lon_min, lon_max) = self.profile.longitude_range();
        (
            round_to(self.rng.gen_range(lat_min..=lat_max), 6),
            round_to(self.rng.gen_range(lon_min..=lon_max), 6),
        )
    }

    fn amount(&mut self, is_fraud: bool) -> f64 {
        let value = if is_fraud {
            self.rng.gen_range(500.0..=5000.0)
        } else {
            self.rng.gen_range(1.0..=1000.0)
        };
        round_to(value, 2)
    }

    fn timestamp(&mut self) -> NaiveDateTime {
        let span = LOOKBACK_DAYS * 24 * 60 * 60;
        self.now - Duration::seconds(self.rng.gen_range(0..=span))
    }

    fn unix_time(&self, processed_at: &NaiveDateTime) -> i64 {
        self.offset
            .from_local_datetime(processed_at)
            .single()
            .map(|local| local.timestamp())
            .unwrap_or_else(|| processed_at.and_utc().timestamp())
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn owned_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
