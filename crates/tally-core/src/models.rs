//! Finance records stored alongside receipts.
//!
//! Field names serialize in camelCase so records written by other clients of
//! the same collections read back unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// User profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Matches the auth provider's user id
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub email: String,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub settings: UserSettings,
}

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// ISO 4217 currency code
    pub currency: String,
    /// BCP 47 locale tag
    pub locale: String,
    pub theme: Theme,
    pub notifications: NotificationSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            locale: "en-US".to_string(),
            theme: Theme::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the system setting
    #[default]
    Auto,
}

/// Which notifications a user has opted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    /// Alert when spending approaches a budget limit
    pub budget_alerts: bool,
}

/// A spending transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub description: String,
    /// When the money was spent
    pub date: DateTime<Utc>,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    /// Blob path of the uploaded receipt
    #[serde(rename = "receiptURL", default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_config: Option<RecurringConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An income transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    /// Where the money came from (employer, client, ...)
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_config: Option<RecurringConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repeat schedule of a recurring transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringConfig {
    pub frequency: Frequency,
    pub start_date: DateTime<Utc>,
    /// Open-ended when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl RecurringConfig {
    /// True if `at` falls inside the schedule's active window.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_date && self.end_date.map_or(true, |end| at <= end)
    }
}

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// Expense/budget category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Hex color, e.g. "#4285F4"
    pub color: String,
    /// Icon identifier
    pub icon: String,
    /// Provided by the app rather than created by the user
    #[serde(default)]
    pub is_system: bool,
    /// Parent category for nested categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A predefined category, before it is assigned to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTemplate {
    pub name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

impl CategoryTemplate {
    /// The new-category payload for `user_id`.
    pub fn for_user(&self, user_id: &str) -> NewCategory {
        NewCategory {
            user_id: user_id.to_string(),
            name: self.name.to_string(),
            color: self.color.to_string(),
            icon: self.icon.to_string(),
            is_system: true,
            parent_id: None,
        }
    }
}

/// Category payload without the fields the repository assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub is_system: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// System categories every new user starts with.
pub const DEFAULT_CATEGORIES: [CategoryTemplate; 10] = [
    CategoryTemplate { name: "Housing", color: "#4285F4", icon: "home" },
    CategoryTemplate { name: "Transportation", color: "#34A853", icon: "directions_car" },
    CategoryTemplate { name: "Food", color: "#FBBC05", icon: "restaurant" },
    CategoryTemplate { name: "Utilities", color: "#EA4335", icon: "power" },
    CategoryTemplate { name: "Healthcare", color: "#9C27B0", icon: "healing" },
    CategoryTemplate { name: "Entertainment", color: "#FF9800", icon: "movie" },
    CategoryTemplate { name: "Personal", color: "#795548", icon: "person" },
    CategoryTemplate { name: "Education", color: "#607D8B", icon: "school" },
    CategoryTemplate { name: "Savings", color: "#009688", icon: "savings" },
    CategoryTemplate { name: "Other", color: "#9E9E9E", icon: "more_horiz" },
];

/// Monthly budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    /// Format: YYYY-MM
    pub month: String,
    #[serde(default)]
    pub categories: Vec<BudgetCategory>,
    pub total_budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Sum of all per-category allocations.
    pub fn allocated(&self) -> f64 {
        self.categories.iter().map(|c| c.amount).sum()
    }

    /// Part of the total not yet given to a category. Negative when
    /// categories are over-allocated.
    pub fn unallocated(&self) -> f64 {
        self.total_budget - self.allocated()
    }

    /// First day of the budget's month, if `month` is well formed.
    pub fn start_date(&self) -> Option<NaiveDate> {
        Self::parse_month(&self.month)
    }

    /// Parse a `YYYY-MM` month key into the first day of that month.
    pub fn parse_month(month: &str) -> Option<NaiveDate> {
        let bytes = month.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return None;
        }
        let year: i32 = month[..4].parse().ok()?;
        let month: u32 = month[5..].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)
    }
}

/// A category's share of a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategory {
    /// Id of the category this allocation is for
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}
