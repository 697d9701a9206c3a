//! Page planning: decide which dynamic pages follow the instructions page.
//!
//! Page 1 is always the instructions page and is not part of the plan. The
//! plan is one page per floor, then (when enabled) one page per triggered
//! build feature. Page numbers are assigned in emission order starting at 2.
//!
//! ## Floor count policy
//!
//! `buildConfig.floors` is coerced like JavaScript's `Number()` and floored.
//! Anything that doesn't come out as at least 1 (missing, `0`, negative,
//! `0.5`, `"lots"`, `{}`) plans exactly **one** floor page. The request is
//! never rejected over it. The count is capped at
//! [`RenderConfig::max_floor_pages`].

use crate::config::RenderConfig;
use crate::payload::{coerce_number, is_truthy, OrderPayload};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// One dynamically generated page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    /// 1-indexed position in the document; dynamic pages start at 2.
    pub page_number: usize,
    pub title: String,
    pub content: PageContent,
}

/// What a planned page is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent {
    /// Assembly of one floor (1-indexed).
    Floor { floor: usize },
    /// A page triggered by a build feature.
    Feature { feature: FeaturePage },
}

/// Build features that get their own page when feature pages are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeaturePage {
    /// `buildConfig.hasBalcony` is truthy.
    Balcony,
    /// `buildConfig.roofType` is `"complex"`.
    Roof,
}

impl FeaturePage {
    pub fn title(self) -> &'static str {
        match self {
            FeaturePage::Balcony => "Balcony Assembly",
            FeaturePage::Roof => "Roof Assembly",
        }
    }

    fn triggered_by(self, build_config: &Map<String, Value>) -> bool {
        match self {
            FeaturePage::Balcony => is_truthy(build_config.get("hasBalcony")),
            FeaturePage::Roof => build_config
                .get("roofType")
                .and_then(Value::as_str)
                .is_some_and(|roof| roof.trim().eq_ignore_ascii_case("complex")),
        }
    }
}

/// Feature pages in the order they are appended.
const FEATURE_PAGES: [FeaturePage; 2] = [FeaturePage::Balcony, FeaturePage::Roof];

/// Compute the ordered list of dynamic pages for `payload`.
///
/// Returns an empty plan when the payload has no `buildConfig` object.
pub fn plan(payload: &OrderPayload, config: &RenderConfig) -> Vec<PageSpec> {
    let Some(build_config) = payload.build_config() else {
        debug!("No buildConfig section; planning no dynamic pages");
        return Vec::new();
    };

    let floors = floor_count(build_config, config.max_floor_pages);
    let mut pages: Vec<PageSpec> = (1..=floors)
        .map(|floor| PageSpec {
            page_number: floor + 1,
            title: format!("Floor {floor}"),
            content: PageContent::Floor { floor },
        })
        .collect();

    if config.feature_pages {
        for feature in FEATURE_PAGES {
            if feature.triggered_by(build_config) {
                pages.push(PageSpec {
                    page_number: pages.len() + 2,
                    title: feature.title().to_string(),
                    content: PageContent::Feature { feature },
                });
            }
        }
    }

    debug!("Planned {} dynamic pages ({} floors)", pages.len(), floors);
    pages
}

/// Number of floor pages for a build configuration, in `1..=cap`.
pub fn floor_count(build_config: &Map<String, Value>, cap: usize) -> usize {
    let requested = build_config
        .get("floors")
        .and_then(coerce_number)
        .map(f64::floor)
        .filter(|n| *n >= 1.0);

    match requested {
        None => 1,
        Some(n) if n > cap as f64 => {
            warn!("buildConfig.floors = {} exceeds the cap; rendering {} floor pages", n, cap);
            cap.max(1)
        }
        Some(n) => n as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plan_for(value: Value) -> Vec<PageSpec> {
        plan(&OrderPayload::new(value), &RenderConfig::default())
    }

    #[test]
    fn no_build_config_means_no_pages() {
        assert!(plan_for(json!({})).is_empty());
        assert!(plan_for(json!({ "buildName": "Cabin" })).is_empty());
        assert!(plan_for(json!({ "buildConfig": null })).is_empty());
        assert!(plan_for(json!({ "buildConfig": "two floors" })).is_empty());
        assert!(plan_for(json!("not even an object")).is_empty());
    }

    #[test]
    fn one_page_per_floor_numbered_from_two() {
        let pages = plan_for(json!({ "buildConfig": { "floors": 3 } }));
        let numbers: Vec<usize> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![2, 3, 4]);
        assert_eq!(pages[0].title, "Floor 1");
        assert_eq!(pages[2].title, "Floor 3");
        assert_eq!(pages[1].content, PageContent::Floor { floor: 2 });
    }

    #[test]
    fn numeric_strings_are_coerced() {
        assert_eq!(plan_for(json!({ "buildConfig": { "floors": "2" } })).len(), 2);
    }

    #[test]
    fn degenerate_floor_counts_become_one() {
        for floors in [
            json!(null),
            json!(0),
            json!(-4),
            json!(0.5),
            json!("lots"),
            json!({}),
            json!([1, 2]),
            json!(false),
        ] {
            let pages = plan_for(json!({ "buildConfig": { "floors": floors.clone() } }));
            assert_eq!(pages.len(), 1, "floors = {floors}");
            assert_eq!(pages[0].page_number, 2);
        }
        assert_eq!(plan_for(json!({ "buildConfig": {} })).len(), 1);
    }

    #[test]
    fn fractional_floors_round_down() {
        assert_eq!(plan_for(json!({ "buildConfig": { "floors": 2.9 } })).len(), 2);
    }

    #[test]
    fn floor_count_is_capped() {
        let config = RenderConfig::builder().max_floor_pages(5).build().unwrap();
        let payload = OrderPayload::new(json!({ "buildConfig": { "floors": 1e9 } }));
        assert_eq!(plan(&payload, &config).len(), 5);
    }

    #[test]
    fn feature_pages_are_inactive_by_default() {
        let pages = plan_for(json!({
            "buildConfig": { "floors": 1, "hasBalcony": true, "roofType": "complex" }
        }));
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn feature_pages_follow_floors_when_enabled() {
        let config = RenderConfig::builder().feature_pages(true).build().unwrap();
        let payload = OrderPayload::new(json!({
            "buildConfig": { "floors": 2, "hasBalcony": true, "roofType": "Complex" }
        }));
        let pages = plan(&payload, &config);
        let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Floor 1", "Floor 2", "Balcony Assembly", "Roof Assembly"]);
        let numbers: Vec<usize> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![2, 3, 4, 5]);
    }

    #[test]
    fn plain_roof_does_not_trigger_roof_page() {
        let config = RenderConfig::builder().feature_pages(true).build().unwrap();
        let payload = OrderPayload::new(json!({
            "buildConfig": { "roofType": "gable", "hasBalcony": false }
        }));
        assert_eq!(plan(&payload, &config).len(), 1);
    }

    #[test]
    fn page_spec_serialises_with_kind_tag() {
        let spec = PageSpec {
            page_number: 2,
            title: "Floor 1".into(),
            content: PageContent::Floor { floor: 1 },
        };
        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["content"]["kind"], "floor");
        assert_eq!(v["content"]["floor"], 1);
    }
}
