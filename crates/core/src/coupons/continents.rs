//! Static geography used by coupon auto-matching.
//!
//! Auto-match codes concatenate a region token with a day count, so the
//! tokens here are lowercase and space-free ("northamerica30").

/// ISO 3166-1 alpha-2 country code to region token.
const COUNTRY_REGIONS: &[(&str, &str)] = &[
    // Europe
    ("AD", "europe"),
    ("AL", "europe"),
    ("AT", "europe"),
    ("BA", "europe"),
    ("BE", "europe"),
    ("BG", "europe"),
    ("BY", "europe"),
    ("CH", "europe"),
    ("CY", "europe"),
    ("CZ", "europe"),
    ("DE", "europe"),
    ("DK", "europe"),
    ("EE", "europe"),
    ("ES", "europe"),
    ("FI", "europe"),
    ("FR", "europe"),
    ("GB", "europe"),
    ("GR", "europe"),
    ("HR", "europe"),
    ("HU", "europe"),
    ("IE", "europe"),
    ("IS", "europe"),
    ("IT", "europe"),
    ("LI", "europe"),
    ("LT", "europe"),
    ("LU", "europe"),
    ("LV", "europe"),
    ("MC", "europe"),
    ("MD", "europe"),
    ("ME", "europe"),
    ("MK", "europe"),
    ("MT", "europe"),
    ("NL", "europe"),
    ("NO", "europe"),
    ("PL", "europe"),
    ("PT", "europe"),
    ("RO", "europe"),
    ("RS", "europe"),
    ("SE", "europe"),
    ("SI", "europe"),
    ("SK", "europe"),
    ("SM", "europe"),
    ("UA", "europe"),
    ("XK", "europe"),
    // Asia
    ("BD", "asia"),
    ("BN", "asia"),
    ("BT", "asia"),
    ("CN", "asia"),
    ("HK", "asia"),
    ("ID", "asia"),
    ("IN", "asia"),
    ("JP", "asia"),
    ("KG", "asia"),
    ("KH", "asia"),
    ("KR", "asia"),
    ("KZ", "asia"),
    ("LA", "asia"),
    ("LK", "asia"),
    ("MM", "asia"),
    ("MN", "asia"),
    ("MO", "asia"),
    ("MY", "asia"),
    ("NP", "asia"),
    ("PH", "asia"),
    ("PK", "asia"),
    ("SG", "asia"),
    ("TH", "asia"),
    ("TJ", "asia"),
    ("TM", "asia"),
    ("TW", "asia"),
    ("UZ", "asia"),
    ("VN", "asia"),
    // Middle East
    ("AE", "middleeast"),
    ("BH", "middleeast"),
    ("IL", "middleeast"),
    ("IQ", "middleeast"),
    ("JO", "middleeast"),
    ("KW", "middleeast"),
    ("LB", "middleeast"),
    ("OM", "middleeast"),
    ("PS", "middleeast"),
    ("QA", "middleeast"),
    ("SA", "middleeast"),
    ("TR", "middleeast"),
    ("YE", "middleeast"),
    // Africa
    ("AO", "africa"),
    ("BF", "africa"),
    ("BJ", "africa"),
    ("BW", "africa"),
    ("CD", "africa"),
    ("CG", "africa"),
    ("CI", "africa"),
    ("CM", "africa"),
    ("CV", "africa"),
    ("DZ", "africa"),
    ("EG", "africa"),
    ("ET", "africa"),
    ("GA", "africa"),
    ("GH", "africa"),
    ("GM", "africa"),
    ("GN", "africa"),
    ("KE", "africa"),
    ("LR", "africa"),
    ("LS", "africa"),
    ("LY", "africa"),
    ("MA", "africa"),
    ("MG", "africa"),
    ("ML", "africa"),
    ("MR", "africa"),
    ("MU", "africa"),
    ("MW", "africa"),
    ("MZ", "africa"),
    ("NA", "africa"),
    ("NE", "africa"),
    ("NG", "africa"),
    ("RW", "africa"),
    ("SC", "africa"),
    ("SD", "africa"),
    ("SL", "africa"),
    ("SN", "africa"),
    ("SO", "africa"),
    ("SZ", "africa"),
    ("TD", "africa"),
    ("TG", "africa"),
    ("TN", "africa"),
    ("TZ", "africa"),
    ("UG", "africa"),
    ("ZA", "africa"),
    ("ZM", "africa"),
    ("ZW", "africa"),
    // North America and the Caribbean
    ("AG", "northamerica"),
    ("BB", "northamerica"),
    ("BS", "northamerica"),
    ("BZ", "northamerica"),
    ("CA", "northamerica"),
    ("CR", "northamerica"),
    ("CU", "northamerica"),
    ("DM", "northamerica"),
    ("DO", "northamerica"),
    ("GD", "northamerica"),
    ("GT", "northamerica"),
    ("HN", "northamerica"),
    ("HT", "northamerica"),
    ("JM", "northamerica"),
    ("KN", "northamerica"),
    ("LC", "northamerica"),
    ("MX", "northamerica"),
    ("NI", "northamerica"),
    ("PA", "northamerica"),
    ("SV", "northamerica"),
    ("TT", "northamerica"),
    ("US", "northamerica"),
    ("VC", "northamerica"),
    // South America
    ("AR", "southamerica"),
    ("BO", "southamerica"),
    ("BR", "southamerica"),
    ("CL", "southamerica"),
    ("CO", "southamerica"),
    ("EC", "southamerica"),
    ("GY", "southamerica"),
    ("PE", "southamerica"),
    ("PY", "southamerica"),
    ("SR", "southamerica"),
    ("UY", "southamerica"),
    ("VE", "southamerica"),
    // Oceania
    ("AU", "oceania"),
    ("FJ", "oceania"),
    ("FM", "oceania"),
    ("KI", "oceania"),
    ("MH", "oceania"),
    ("NR", "oceania"),
    ("NZ", "oceania"),
    ("PG", "oceania"),
    ("PW", "oceania"),
    ("SB", "oceania"),
    ("TO", "oceania"),
    ("TV", "oceania"),
    ("VU", "oceania"),
    ("WS", "oceania"),
];

/// Substrings of bundle display names that reveal the region. Checked in
/// order; more specific markers come first so "North America" never matches
/// the bare "america".
const NAME_MARKERS: &[(&str, &str)] = &[
    ("north america", "northamerica"),
    ("south america", "southamerica"),
    ("latin america", "southamerica"),
    ("middle east", "middleeast"),
    ("europe", "europe"),
    ("eu+", "europe"),
    ("asia", "asia"),
    ("africa", "africa"),
    ("oceania", "oceania"),
    ("caribbean", "northamerica"),
];

/// Region token for an ISO country code, case-insensitive.
pub fn region_for_country(iso: &str) -> Option<&'static str> {
    let needle = iso.trim().to_ascii_uppercase();
    COUNTRY_REGIONS
        .iter()
        .find(|(code, _)| *code == needle)
        .map(|(_, region)| *region)
}

/// Region token sniffed out of a bundle display name.
pub fn region_for_bundle_name(name: &str) -> Option<&'static str> {
    let lowered = name.to_ascii_lowercase();
    NAME_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, region)| *region)
}
