use crate::domain::bundle::Bundle;
use crate::errors::PricingError;

/// Outcome of bundle selection.
///
/// `previous` is the next-shorter bundle on the validity ladder. It is the
/// anchor for unused-day proration and stays `None` on an exact match, where
/// nothing is prorated.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleSelection<'a> {
    pub selected: &'a Bundle,
    pub previous: Option<&'a Bundle>,
}

/// Picks the bundle to quote for a requested duration.
///
/// Preference order: exact validity match, then the smallest bundle that
/// covers the request, then the longest available bundle when the request
/// outlasts the whole catalog.
pub fn select_bundle<'a>(
    bundles: &'a [Bundle],
    requested_days: u32,
) -> Result<BundleSelection<'a>, PricingError> {
    if let Some(selected) = bundles
        .iter()
        .find(|bundle| bundle.validity_in_days == requested_days)
    {
        return Ok(BundleSelection {
            selected,
            previous: None,
        });
    }

    let smallest_suitable = bundles
        .iter()
        .filter(|bundle| bundle.validity_in_days >= requested_days)
        .min_by_key(|bundle| bundle.validity_in_days);

    let selected = match smallest_suitable {
        Some(bundle) => bundle,
        None => bundles
            .iter()
            .max_by_key(|bundle| bundle.validity_in_days)
            .ok_or(PricingError::NoBundleAvailable)?,
    };

    Ok(BundleSelection {
        selected,
        previous: next_shorter(bundles, selected.validity_in_days),
    })
}

/// Longest bundle strictly shorter than `validity_in_days`.
pub fn next_shorter(bundles: &[Bundle], validity_in_days: u32) -> Option<&Bundle> {
    bundles
        .iter()
        .filter(|bundle| bundle.validity_in_days < validity_in_days)
        .max_by_key(|bundle| bundle.validity_in_days)
}
