//! Fixed category catalog.
//!
//! Two groups ship with the app. The catalog feeds the add form's category
//! listing and the per-group totals in the summary; categories outside it are
//! still accepted as free text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGroup {
    Personal,
    Business,
}

pub const PERSONAL_CATEGORIES: &[&str] = &[
    "Rent / Mortgage",
    "Utilities (Electricity, Water, Gas)",
    "Groceries",
    "Transportation (Fuel, Public Transport, Parking)",
    "Internet and Mobile",
    "Insurance - Health",
    "Insurance - Car",
    "Insurance - Home",
    "Loan Payments",
    "Subscriptions (Netflix, Spotify, etc.)",
    "Medical / Health Expenses",
    "Education / Tuition",
    "Clothing",
    "Personal Care (Salon, Grooming, etc.)",
    "Dining Out",
    "Travel / Vacation",
    "Entertainment (Movies, Games, Events)",
    "Gifts & Donations",
    "Childcare",
    "Pet Expenses",
    "Home Maintenance / Repairs",
    "Emergency Fund",
    "Investments",
    "Hobby / Leisure Expenses",
    "Miscellaneous",
    "Crypto Transaction",
];

pub const BUSINESS_CATEGORIES: &[&str] = &[
    "Office Rent",
    "Office Utilities",
    "Office Supplies & Equipment",
    "Employee Salaries & Wages",
    "Contractor / Freelancer Payments",
    "Software & Subscriptions (Business)",
    "Advertising & Marketing",
    "Business Internet & Phone",
    "Business Travel & Accommodation",
    "Client Meals & Entertainment",
    "Business Insurance (Liability, etc.)",
    "Training & Development",
    "Taxes & Legal Fees",
    "Bank Charges & Fees",
    "Business Maintenance & Repairs",
];

impl CategoryGroup {
    pub const ALL: [CategoryGroup; 2] = [CategoryGroup::Personal, CategoryGroup::Business];

    pub fn label(self) -> &'static str {
        match self {
            CategoryGroup::Personal => "Personal",
            CategoryGroup::Business => "Business",
        }
    }

    pub fn categories(self) -> &'static [&'static str] {
        match self {
            CategoryGroup::Personal => PERSONAL_CATEGORIES,
            CategoryGroup::Business => BUSINESS_CATEGORIES,
        }
    }
}

/// Looks a category name up in the catalog, ignoring case and surrounding
/// whitespace. Returns `None` for free-text categories.
pub fn classify(category: &str) -> Option<CategoryGroup> {
    let wanted = category.trim();
    for group in CategoryGroup::ALL {
        if group
            .categories()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(wanted))
        {
            return Some(group);
        }
    }
    None
}
