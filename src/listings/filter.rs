//! Conjunctive listing filter.
//!
//! A [`ListingFilter`] is a sparse set of constraints: exact, case-sensitive
//! equality on the text fields and inclusive bounds on price and year. Absent
//! constraints match everything. Results are ordered by ascending price and
//! keep insertion order among equal prices.

use serde::{de, Deserialize, Deserializer};

use super::repo_types::Listing;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingFilter {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub body_style: Option<String>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub region: Option<String>,
    pub vehicle_condition: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub min_price: Option<i32>,
    #[serde(deserialize_with = "blank_as_none")]
    pub max_price: Option<i32>,
    #[serde(deserialize_with = "blank_as_none")]
    pub min_year: Option<i32>,
    #[serde(deserialize_with = "blank_as_none")]
    pub max_year: Option<i32>,
}

/// `?minPrice=` is no bound; anything else must parse as a number.
fn blank_as_none<'de, D>(de: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(de)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number {raw:?}"))),
        _ => Ok(None),
    }
}

/// Text columns that take an equality constraint, paired with the filter value.
pub type TextConstraint<'a> = (&'static str, &'a str);

impl ListingFilter {
    /// Drops empty-string values so that `?brand=` means "any brand".
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.brand,
            &mut self.model,
            &mut self.color,
            &mut self.body_style,
            &mut self.fuel,
            &mut self.transmission,
            &mut self.region,
            &mut self.vehicle_condition,
        ] {
            if field.as_deref().is_some_and(str::is_empty) {
                *field = None;
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text_constraints().is_empty()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_year.is_none()
            && self.max_year.is_none()
    }

    /// Present text constraints keyed by column name.
    pub fn text_constraints(&self) -> Vec<TextConstraint<'_>> {
        [
            ("brand", &self.brand),
            ("model", &self.model),
            ("color", &self.color),
            ("body_style", &self.body_style),
            ("fuel", &self.fuel),
            ("transmission", &self.transmission),
            ("region", &self.region),
            ("vehicle_condition", &self.vehicle_condition),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (column, v))
        })
        .collect()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        let text_ok = self.text_constraints().into_iter().all(|(column, want)| {
            let have = match column {
                "brand" => &listing.brand,
                "model" => &listing.model,
                "color" => &listing.color,
                "body_style" => &listing.body_style,
                "fuel" => &listing.fuel,
                "transmission" => &listing.transmission,
                "region" => &listing.region,
                _ => &listing.vehicle_condition,
            };
            have == want
        });

        text_ok
            && within(listing.price, self.min_price, self.max_price)
            && within(listing.year, self.min_year, self.max_year)
    }

    /// Filters an insertion-ordered snapshot and sorts it by price.
    pub fn apply(&self, listings: impl IntoIterator<Item = Listing>) -> Vec<Listing> {
        let mut out: Vec<Listing> = listings.into_iter().filter(|l| self.matches(l)).collect();
        // stable
        out.sort_by_key(|l| l.price);
        out
    }
}

fn within(value: i32, min: Option<i32>, max: Option<i32>) -> bool {
    min.map_or(true, |lo| value >= lo) && max.map_or(true, |hi| value <= hi)
}
