//! Static ISO 3166-1 alpha-2 country to continent table.
//!
//! Continent codes follow the GeoNames/MaxMind convention:
//! `AF`, `AN`, `AS`, `EU`, `NA`, `OC`, `SA`.

/// Returns the continent code for a country code, case-insensitively.
pub fn continent_for_country(country: &str) -> Option<&'static str> {
    let code = country.trim().to_ascii_uppercase();
    let continent = match code.as_str() {
        "DZ" | "AO" | "BJ" | "BW" | "BF" | "BI" | "CV" | "CM" | "CF" | "TD" | "KM" | "CG"
        | "CD" | "CI" | "DJ" | "EG" | "GQ" | "ER" | "SZ" | "ET" | "GA" | "GM" | "GH" | "GN"
        | "GW" | "KE" | "LS" | "LR" | "LY" | "MG" | "MW" | "ML" | "MR" | "MU" | "YT" | "MA"
        | "MZ" | "NA" | "NE" | "NG" | "RE" | "RW" | "SH" | "ST" | "SN" | "SC" | "SL" | "SO"
        | "ZA" | "SS" | "SD" | "TZ" | "TG" | "TN" | "UG" | "EH" | "ZM" | "ZW" => "AF",

        "AQ" | "BV" | "GS" | "HM" | "TF" => "AN",

        "AF" | "AM" | "AZ" | "BH" | "BD" | "BT" | "BN" | "KH" | "CN" | "GE" | "HK" | "IN"
        | "ID" | "IR" | "IQ" | "IL" | "JP" | "JO" | "KZ" | "KW" | "KG" | "LA" | "LB" | "MO"
        | "MY" | "MV" | "MN" | "MM" | "NP" | "KP" | "OM" | "PK" | "PS" | "PH" | "QA" | "SA"
        | "SG" | "KR" | "LK" | "SY" | "TW" | "TJ" | "TH" | "TL" | "TR" | "TM" | "AE" | "UZ"
        | "VN" | "YE" | "IO" | "CC" | "CX" => "AS",

        "AD" | "AL" | "AT" | "AX" | "BA" | "BE" | "BG" | "BY" | "CH" | "CY" | "CZ" | "DE"
        | "DK" | "EE" | "ES" | "FI" | "FO" | "FR" | "GB" | "GG" | "GI" | "GR" | "HR" | "HU"
        | "IE" | "IM" | "IS" | "IT" | "JE" | "LI" | "LT" | "LU" | "LV" | "MC" | "MD" | "ME"
        | "MK" | "MT" | "NL" | "NO" | "PL" | "PT" | "RO" | "RS" | "RU" | "SE" | "SI" | "SJ"
        | "SK" | "SM" | "UA" | "VA" | "XK" => "EU",

        "AG" | "AI" | "AW" | "BB" | "BL" | "BM" | "BQ" | "BS" | "BZ" | "CA" | "CR" | "CU"
        | "CW" | "DM" | "DO" | "GD" | "GL" | "GP" | "GT" | "HN" | "HT" | "JM" | "KN" | "KY"
        | "LC" | "MF" | "MQ" | "MS" | "MX" | "NI" | "PA" | "PM" | "PR" | "SV" | "SX" | "TC"
        | "TT" | "US" | "UM" | "VC" | "VG" | "VI" => "NA",

        "AS" | "AU" | "CK" | "FJ" | "FM" | "GU" | "KI" | "MH" | "MP" | "NC" | "NF" | "NR"
        | "NU" | "NZ" | "PF" | "PG" | "PN" | "PW" | "SB" | "TK" | "TO" | "TV" | "VU" | "WF"
        | "WS" => "OC",

        "AR" | "BO" | "BR" | "CL" | "CO" | "EC" | "FK" | "GF" | "GY" | "PE" | "PY" | "SR"
        | "UY" | "VE" => "SA",

        _ => return None,
    };

    Some(continent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_countries() {
        assert_eq!(continent_for_country("DE"), Some("EU"));
        assert_eq!(continent_for_country("US"), Some("NA"));
        assert_eq!(continent_for_country("BR"), Some("SA"));
        assert_eq!(continent_for_country("JP"), Some("AS"));
        assert_eq!(continent_for_country("NG"), Some("AF"));
        assert_eq!(continent_for_country("AU"), Some("OC"));
        assert_eq!(continent_for_country("AQ"), Some("AN"));
    }

    #[test]
    fn test_lowercase_input() {
        assert_eq!(continent_for_country("fr"), Some("EU"));
    }

    #[test]
    fn test_country_code_shared_with_continent_code() {
        // "AS" is American Samoa, not Asia.
        assert_eq!(continent_for_country("AS"), Some("OC"));
    }

    #[test]
    fn test_unknown_country() {
        assert_eq!(continent_for_country("ZZ"), None);
        assert_eq!(continent_for_country(""), None);
    }
}
