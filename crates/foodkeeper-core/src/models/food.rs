use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Items with this many days left or fewer count as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Expired,
    ExpiresToday,
    ExpiringSoon,
    Fresh,
}

impl std::fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpiryStatus::Expired => write!(f, "Expired"),
            ExpiryStatus::ExpiresToday => write!(f, "Expires today"),
            ExpiryStatus::ExpiringSoon => write!(f, "Expiring soon"),
            ExpiryStatus::Fresh => write!(f, "Fresh"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(rename = "purchaseDate", default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(rename = "expiryDate")]
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub memo: Option<String>,
}

impl FoodItem {
    /// Negative once the expiry date has passed.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    pub fn expiry_status(&self, today: NaiveDate) -> ExpiryStatus {
        match self.days_until_expiry(today) {
            d if d < 0 => ExpiryStatus::Expired,
            0 => ExpiryStatus::ExpiresToday,
            d if d <= EXPIRING_SOON_DAYS => ExpiryStatus::ExpiringSoon,
            _ => ExpiryStatus::Fresh,
        }
    }

    /// "D-3", "D-Day", "D+2"
    pub fn d_day_label(&self, today: NaiveDate) -> String {
        match self.days_until_expiry(today) {
            0 => "D-Day".to_string(),
            d if d > 0 => format!("D-{}", d),
            d => format!("D+{}", -d),
        }
    }
}

/// Sort so the most urgent items come first, then by name.
pub fn sort_by_urgency(items: &mut [FoodItem]) {
    items.sort_by(|a, b| {
        a.expiry_date
            .cmp(&b.expiry_date)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

/// Body for registering a new item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFoodItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(rename = "purchaseDate", skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(rename = "expiryDate")]
    pub expiry_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl NewFoodItem {
    pub fn new(name: impl Into<String>, expiry_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            category: None,
            quantity: None,
            purchase_date: None,
            expiry_date,
            memo: None,
        }
    }
}
