//! UTM parameter rewriting of destination URLs.

use url::Url;

use crate::domain::entities::UtmParams;

/// Sets the link's UTM parameters on `destination`.
///
/// Each present, non-empty parameter overrides any existing value for its
/// key; duplicates of that key are collapsed into one. Other query
/// parameters keep their order. Applying the same parameters twice yields
/// the same URL. An unparsable destination is returned unchanged.
pub fn apply_utm(destination: &str, utm: Option<&UtmParams>) -> String {
    let Some(utm) = utm else {
        return destination.to_string();
    };
    let overrides = utm.non_empty_pairs();
    if overrides.is_empty() {
        return destination.to_string();
    }
    let Ok(mut url) = Url::parse(destination) else {
        return destination.to_string();
    };

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut applied: Vec<&str> = Vec::new();

    for (key, value) in url.query_pairs().into_owned() {
        match overrides.iter().find(|(k, _)| *k == key) {
            Some((k, v)) if !applied.contains(k) => {
                pairs.push((key, (*v).to_string()));
                applied.push(*k);
            }
            Some(_) => {}
            None => pairs.push((key, value)),
        }
    }

    for (k, v) in &overrides {
        if !applied.contains(k) {
            pairs.push(((*k).to_string(), (*v).to_string()));
        }
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}
