//! ICAO 24-bit address block allocation by country.
//!
//! Every transponder broadcasts a 24-bit address drawn from a block that ICAO
//! allocates to the state of registry. Looking the address up in the block
//! table gives the country an aircraft is registered in, independent of any
//! callsign or registration the feed may or may not carry.

use serde::Serialize;

/// Flag shown for addresses outside every allocated block
pub const UNKNOWN_FLAG: &str = "❓";

/// Flag shown for a country name that is not in the block table
pub const FALLBACK_FLAG: &str = "🏳️";

/// One allocated address block, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexRange {
    pub start: u32,
    pub end: u32,
    pub country: &'static str,
    pub code: &'static str,
    pub flag: &'static str,
}

impl HexRange {
    pub const fn new(
        start: u32,
        end: u32,
        country: &'static str,
        code: &'static str,
        flag: &'static str,
    ) -> Self {
        Self {
            start,
            end,
            country,
            code,
            flag,
        }
    }

    pub fn contains(&self, address: u32) -> bool {
        self.start <= address && address <= self.end
    }

    fn info(&self) -> CountryInfo {
        CountryInfo {
            country: self.country,
            code: self.code,
            flag: self.flag,
        }
    }
}

/// Country metadata resolved for an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountryInfo {
    pub country: &'static str,
    pub code: &'static str,
    pub flag: &'static str,
}

impl CountryInfo {
    pub const UNKNOWN: CountryInfo = CountryInfo {
        country: "Unknown",
        code: "XX",
        flag: UNKNOWN_FLAG,
    };

    pub fn is_unknown(&self) -> bool {
        self.code == Self::UNKNOWN.code
    }
}

#[derive(Debug, Clone)]
struct IndexedRange {
    range: HexRange,
    /// Position in the table the classifier was built from
    order: usize,
}

/// Interval lookup over a set of address blocks.
///
/// The blocks are sorted by start address once at construction. Lookups
/// binary-search for the candidates whose start is at or below the address and
/// walk backwards only while the running maximum end can still reach it. When
/// blocks overlap (a defect in the data, not something the curated table
/// contains) the block that came first in the input wins, so results never
/// depend on how the sort arranged equal starts.
#[derive(Debug, Clone)]
pub struct HexRangeClassifier {
    ranges: Vec<IndexedRange>,
    /// `reach[i]` is the largest `end` among `ranges[..=i]`
    reach: Vec<u32>,
}

impl Default for HexRangeClassifier {
    fn default() -> Self {
        Self::new(ICAO_HEX_RANGES)
    }
}

impl HexRangeClassifier {
    pub fn new(table: &[HexRange]) -> Self {
        let mut ranges: Vec<IndexedRange> = table
            .iter()
            .enumerate()
            .map(|(order, range)| IndexedRange {
                range: *range,
                order,
            })
            .collect();
        ranges.sort_by_key(|r| (r.range.start, r.order));

        let mut reach = Vec::with_capacity(ranges.len());
        let mut max_end = 0u32;
        for r in &ranges {
            max_end = max_end.max(r.range.end);
            reach.push(max_end);
        }

        Self { ranges, reach }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Classify a hex address string as it appears in the feed.
    ///
    /// Whitespace is ignored and case does not matter. Anything that does not
    /// parse as a 24-bit hex number (readsb marks non-ICAO addresses with a
    /// leading `~`, for instance) is Unknown.
    pub fn classify(&self, hex: &str) -> CountryInfo {
        let cleaned: String = hex
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
            return CountryInfo::UNKNOWN;
        }

        match u32::from_str_radix(&cleaned, 16) {
            Ok(address) if address <= 0xFF_FFFF => self.classify_address(address),
            _ => CountryInfo::UNKNOWN,
        }
    }

    /// Classify a numeric 24-bit address
    pub fn classify_address(&self, address: u32) -> CountryInfo {
        let upper = self.ranges.partition_point(|r| r.range.start <= address);

        let mut best: Option<&IndexedRange> = None;
        for i in (0..upper).rev() {
            if self.reach[i] < address {
                break;
            }
            let candidate = &self.ranges[i];
            if candidate.range.contains(address)
                && best.is_none_or(|b| candidate.order < b.order)
            {
                best = Some(candidate);
            }
        }

        best.map(|r| r.range.info()).unwrap_or(CountryInfo::UNKNOWN)
    }

    /// Flag for a two-letter country code, as stored on a sighting
    pub fn flag_for_code(&self, code: &str) -> Option<&'static str> {
        if code.is_empty() || code == CountryInfo::UNKNOWN.code {
            return None;
        }
        self.first_authored(|r| r.code.eq_ignore_ascii_case(code))
            .map(|r| r.flag)
    }

    /// Flag for a country name, matched case-insensitively
    pub fn flag_for_country(&self, country: &str) -> &'static str {
        if country.is_empty() || country == CountryInfo::UNKNOWN.country {
            return FALLBACK_FLAG;
        }
        self.first_authored(|r| r.country.eq_ignore_ascii_case(country))
            .map(|r| r.flag)
            .unwrap_or(FALLBACK_FLAG)
    }

    fn first_authored(&self, pred: impl Fn(&HexRange) -> bool) -> Option<&HexRange> {
        self.ranges
            .iter()
            .filter(|r| pred(&r.range))
            .min_by_key(|r| r.order)
            .map(|r| &r.range)
    }
}

/// ICAO address blocks by state of registry
pub const ICAO_HEX_RANGES: &[HexRange] = &[
    HexRange::new(0x004000, 0x0043FF, "Zimbabwe", "ZW", "🇿🇼"),
    HexRange::new(0x006000, 0x006FFF, "Mozambique", "MZ", "🇲🇿"),
    HexRange::new(0x008000, 0x00FFFF, "South Africa", "ZA", "🇿🇦"),
    HexRange::new(0x010000, 0x017FFF, "Egypt", "EG", "🇪🇬"),
    HexRange::new(0x018000, 0x01FFFF, "Libya", "LY", "🇱🇾"),
    HexRange::new(0x020000, 0x027FFF, "Morocco", "MA", "🇲🇦"),
    HexRange::new(0x028000, 0x02FFFF, "Tunisia", "TN", "🇹🇳"),
    HexRange::new(0x030000, 0x0303FF, "Botswana", "BW", "🇧🇼"),
    HexRange::new(0x032000, 0x032FFF, "Burundi", "BI", "🇧🇮"),
    HexRange::new(0x034000, 0x034FFF, "Cameroon", "CM", "🇨🇲"),
    HexRange::new(0x035000, 0x0353FF, "Comoros", "KM", "🇰🇲"),
    HexRange::new(0x036000, 0x036FFF, "Congo", "CG", "🇨🇬"),
    HexRange::new(0x038000, 0x038FFF, "Cote d'Ivoire", "CI", "🇨🇮"),
    HexRange::new(0x03E000, 0x03EFFF, "Gabon", "GA", "🇬🇦"),
    HexRange::new(0x040000, 0x040FFF, "Ethiopia", "ET", "🇪🇹"),
    HexRange::new(0x042000, 0x042FFF, "Equatorial Guinea", "GQ", "🇬🇶"),
    HexRange::new(0x044000, 0x044FFF, "Ghana", "GH", "🇬🇭"),
    HexRange::new(0x046000, 0x046FFF, "Guinea", "GN", "🇬🇳"),
    HexRange::new(0x048000, 0x0483FF, "Guinea-Bissau", "GW", "🇬🇼"),
    HexRange::new(0x04A000, 0x04A3FF, "Lesotho", "LS", "🇱🇸"),
    HexRange::new(0x04C000, 0x04CFFF, "Kenya", "KE", "🇰🇪"),
    HexRange::new(0x050000, 0x050FFF, "Liberia", "LR", "🇱🇷"),
    HexRange::new(0x054000, 0x054FFF, "Madagascar", "MG", "🇲🇬"),
    HexRange::new(0x058000, 0x058FFF, "Malawi", "MW", "🇲🇼"),
    HexRange::new(0x05A000, 0x05A3FF, "Maldives", "MV", "🇲🇻"),
    HexRange::new(0x05C000, 0x05CFFF, "Mali", "ML", "🇲🇱"),
    HexRange::new(0x05E000, 0x05E3FF, "Mauritania", "MR", "🇲🇷"),
    HexRange::new(0x060000, 0x0603FF, "Mauritius", "MU", "🇲🇺"),
    HexRange::new(0x062000, 0x062FFF, "Niger", "NE", "🇳🇪"),
    HexRange::new(0x064000, 0x064FFF, "Nigeria", "NG", "🇳🇬"),
    HexRange::new(0x068000, 0x068FFF, "Uganda", "UG", "🇺🇬"),
    HexRange::new(0x06A000, 0x06A3FF, "Qatar", "QA", "🇶🇦"),
    HexRange::new(0x06C000, 0x06CFFF, "Central African Republic", "CF", "🇨🇫"),
    HexRange::new(0x06E000, 0x06EFFF, "Rwanda", "RW", "🇷🇼"),
    HexRange::new(0x070000, 0x070FFF, "Senegal", "SN", "🇸🇳"),
    HexRange::new(0x074000, 0x0743FF, "Seychelles", "SC", "🇸🇨"),
    HexRange::new(0x076000, 0x0763FF, "Sierra Leone", "SL", "🇸🇱"),
    HexRange::new(0x078000, 0x078FFF, "Somalia", "SO", "🇸🇴"),
    HexRange::new(0x07A000, 0x07A3FF, "Eswatini", "SZ", "🇸🇿"),
    HexRange::new(0x07C000, 0x07CFFF, "Sudan", "SD", "🇸🇩"),
    HexRange::new(0x080000, 0x080FFF, "Tanzania", "TZ", "🇹🇿"),
    HexRange::new(0x084000, 0x084FFF, "Chad", "TD", "🇹🇩"),
    HexRange::new(0x088000, 0x088FFF, "Togo", "TG", "🇹🇬"),
    HexRange::new(0x08A000, 0x08AFFF, "Zambia", "ZM", "🇿🇲"),
    HexRange::new(0x08C000, 0x08CFFF, "Democratic Republic of the Congo", "CD", "🇨🇩"),
    HexRange::new(0x090000, 0x090FFF, "Angola", "AO", "🇦🇴"),
    HexRange::new(0x094000, 0x0943FF, "Benin", "BJ", "🇧🇯"),
    HexRange::new(0x096000, 0x0963FF, "Cape Verde", "CV", "🇨🇻"),
    HexRange::new(0x098000, 0x0983FF, "Djibouti", "DJ", "🇩🇯"),
    HexRange::new(0x09A000, 0x09AFFF, "Gambia", "GM", "🇬🇲"),
    HexRange::new(0x09C000, 0x09CFFF, "Burkina Faso", "BF", "🇧🇫"),
    HexRange::new(0x09E000, 0x09E3FF, "Sao Tome and Principe", "ST", "🇸🇹"),
    HexRange::new(0x0A0000, 0x0A7FFF, "Algeria", "DZ", "🇩🇿"),
    HexRange::new(0x0A8000, 0x0A8FFF, "Bahamas", "BS", "🇧🇸"),
    HexRange::new(0x0AA000, 0x0AA3FF, "Barbados", "BB", "🇧🇧"),
    HexRange::new(0x0AB000, 0x0AB3FF, "Belize", "BZ", "🇧🇿"),
    HexRange::new(0x0AC000, 0x0ACFFF, "Colombia", "CO", "🇨🇴"),
    HexRange::new(0x0AE000, 0x0AEFFF, "Costa Rica", "CR", "🇨🇷"),
    HexRange::new(0x0B0000, 0x0B0FFF, "Cuba", "CU", "🇨🇺"),
    HexRange::new(0x0B2000, 0x0B2FFF, "El Salvador", "SV", "🇸🇻"),
    HexRange::new(0x0B4000, 0x0B4FFF, "Guatemala", "GT", "🇬🇹"),
    HexRange::new(0x0B6000, 0x0B6FFF, "Guyana", "GY", "🇬🇾"),
    HexRange::new(0x0B8000, 0x0B8FFF, "Haiti", "HT", "🇭🇹"),
    HexRange::new(0x0BA000, 0x0BAFFF, "Honduras", "HN", "🇭🇳"),
    HexRange::new(0x0BC000, 0x0BC3FF, "Saint Vincent and the Grenadines", "VC", "🇻🇨"),
    HexRange::new(0x0BE000, 0x0BEFFF, "Jamaica", "JM", "🇯🇲"),
    HexRange::new(0x0C0000, 0x0C0FFF, "Nicaragua", "NI", "🇳🇮"),
    HexRange::new(0x0C2000, 0x0C2FFF, "Panama", "PA", "🇵🇦"),
    HexRange::new(0x0C4000, 0x0C4FFF, "Dominican Republic", "DO", "🇩🇴"),
    HexRange::new(0x0C6000, 0x0C6FFF, "Trinidad and Tobago", "TT", "🇹🇹"),
    HexRange::new(0x0C8000, 0x0C8FFF, "Suriname", "SR", "🇸🇷"),
    HexRange::new(0x0CA000, 0x0CA3FF, "Antigua and Barbuda", "AG", "🇦🇬"),
    HexRange::new(0x0CC000, 0x0CC3FF, "Grenada", "GD", "🇬🇩"),
    HexRange::new(0x0D0000, 0x0D7FFF, "Mexico", "MX", "🇲🇽"),
    HexRange::new(0x0D8000, 0x0DFFFF, "Venezuela", "VE", "🇻🇪"),
    HexRange::new(0x100000, 0x1FFFFF, "Russian Federation", "RU", "🇷🇺"),
    HexRange::new(0x201000, 0x2013FF, "Namibia", "NA", "🇳🇦"),
    HexRange::new(0x202000, 0x2023FF, "Eritrea", "ER", "🇪🇷"),
    HexRange::new(0x300000, 0x33FFFF, "Italy", "IT", "🇮🇹"),
    HexRange::new(0x340000, 0x37FFFF, "Spain", "ES", "🇪🇸"),
    HexRange::new(0x380000, 0x3BFFFF, "France", "FR", "🇫🇷"),
    HexRange::new(0x3C0000, 0x3FFFFF, "Germany", "DE", "🇩🇪"),
    HexRange::new(0x400000, 0x43FFFF, "United Kingdom", "GB", "🇬🇧"),
    HexRange::new(0x440000, 0x447FFF, "Austria", "AT", "🇦🇹"),
    HexRange::new(0x448000, 0x44FFFF, "Belgium", "BE", "🇧🇪"),
    HexRange::new(0x450000, 0x457FFF, "Bulgaria", "BG", "🇧🇬"),
    HexRange::new(0x458000, 0x45FFFF, "Denmark", "DK", "🇩🇰"),
    HexRange::new(0x460000, 0x467FFF, "Finland", "FI", "🇫🇮"),
    HexRange::new(0x468000, 0x46FFFF, "Greece", "GR", "🇬🇷"),
    HexRange::new(0x470000, 0x477FFF, "Hungary", "HU", "🇭🇺"),
    HexRange::new(0x478000, 0x47FFFF, "Norway", "NO", "🇳🇴"),
    HexRange::new(0x480000, 0x487FFF, "Netherlands", "NL", "🇳🇱"),
    HexRange::new(0x488000, 0x48FFFF, "Poland", "PL", "🇵🇱"),
    HexRange::new(0x490000, 0x497FFF, "Portugal", "PT", "🇵🇹"),
    HexRange::new(0x498000, 0x49FFFF, "Czech Republic", "CZ", "🇨🇿"),
    HexRange::new(0x4A0000, 0x4A7FFF, "Romania", "RO", "🇷🇴"),
    HexRange::new(0x4A8000, 0x4AFFFF, "Sweden", "SE", "🇸🇪"),
    HexRange::new(0x4B0000, 0x4B7FFF, "Switzerland", "CH", "🇨🇭"),
    HexRange::new(0x4B8000, 0x4BFFFF, "Turkey", "TR", "🇹🇷"),
    HexRange::new(0x4C0000, 0x4C7FFF, "Serbia", "RS", "🇷🇸"),
    HexRange::new(0x4C8000, 0x4C83FF, "Cyprus", "CY", "🇨🇾"),
    HexRange::new(0x4CA000, 0x4CAFFF, "Ireland", "IE", "🇮🇪"),
    HexRange::new(0x4CC000, 0x4CCFFF, "Iceland", "IS", "🇮🇸"),
    HexRange::new(0x4D0000, 0x4D03FF, "Luxembourg", "LU", "🇱🇺"),
    HexRange::new(0x4D2000, 0x4D23FF, "Malta", "MT", "🇲🇹"),
    HexRange::new(0x4D4000, 0x4D43FF, "Monaco", "MC", "🇲🇨"),
    HexRange::new(0x500000, 0x5003FF, "San Marino", "SM", "🇸🇲"),
    HexRange::new(0x501000, 0x5013FF, "Albania", "AL", "🇦🇱"),
    HexRange::new(0x501C00, 0x501FFF, "Croatia", "HR", "🇭🇷"),
    HexRange::new(0x502C00, 0x502FFF, "Latvia", "LV", "🇱🇻"),
    HexRange::new(0x503C00, 0x503FFF, "Lithuania", "LT", "🇱🇹"),
    HexRange::new(0x504C00, 0x504FFF, "Moldova", "MD", "🇲🇩"),
    HexRange::new(0x505C00, 0x505FFF, "Slovakia", "SK", "🇸🇰"),
    HexRange::new(0x506C00, 0x506FFF, "Slovenia", "SI", "🇸🇮"),
    HexRange::new(0x507C00, 0x507FFF, "Uzbekistan", "UZ", "🇺🇿"),
    HexRange::new(0x508000, 0x50FFFF, "Ukraine", "UA", "🇺🇦"),
    HexRange::new(0x510000, 0x5103FF, "Belarus", "BY", "🇧🇾"),
    HexRange::new(0x511000, 0x5113FF, "Estonia", "EE", "🇪🇪"),
    HexRange::new(0x512000, 0x5123FF, "North Macedonia", "MK", "🇲🇰"),
    HexRange::new(0x513000, 0x5133FF, "Bosnia and Herzegovina", "BA", "🇧🇦"),
    HexRange::new(0x514000, 0x5143FF, "Georgia", "GE", "🇬🇪"),
    HexRange::new(0x515000, 0x5153FF, "Tajikistan", "TJ", "🇹🇯"),
    HexRange::new(0x516000, 0x5163FF, "Montenegro", "ME", "🇲🇪"),
    HexRange::new(0x600000, 0x6003FF, "Armenia", "AM", "🇦🇲"),
    HexRange::new(0x600800, 0x600BFF, "Azerbaijan", "AZ", "🇦🇿"),
    HexRange::new(0x601000, 0x6013FF, "Kyrgyzstan", "KG", "🇰🇬"),
    HexRange::new(0x601800, 0x601BFF, "Turkmenistan", "TM", "🇹🇲"),
    HexRange::new(0x680000, 0x6803FF, "Bhutan", "BT", "🇧🇹"),
    HexRange::new(0x681000, 0x6813FF, "Micronesia", "FM", "🇫🇲"),
    HexRange::new(0x682000, 0x6823FF, "Mongolia", "MN", "🇲🇳"),
    HexRange::new(0x683000, 0x6833FF, "Kazakhstan", "KZ", "🇰🇿"),
    HexRange::new(0x684000, 0x6843FF, "Palau", "PW", "🇵🇼"),
    HexRange::new(0x700000, 0x700FFF, "Afghanistan", "AF", "🇦🇫"),
    HexRange::new(0x702000, 0x702FFF, "Bangladesh", "BD", "🇧🇩"),
    HexRange::new(0x704000, 0x704FFF, "Myanmar", "MM", "🇲🇲"),
    HexRange::new(0x706000, 0x706FFF, "Kuwait", "KW", "🇰🇼"),
    HexRange::new(0x708000, 0x708FFF, "Laos", "LA", "🇱🇦"),
    HexRange::new(0x70A000, 0x70AFFF, "Nepal", "NP", "🇳🇵"),
    HexRange::new(0x70C000, 0x70C3FF, "Oman", "OM", "🇴🇲"),
    HexRange::new(0x70E000, 0x70EFFF, "Cambodia", "KH", "🇰🇭"),
    HexRange::new(0x710000, 0x717FFF, "Saudi Arabia", "SA", "🇸🇦"),
    HexRange::new(0x718000, 0x71FFFF, "South Korea", "KR", "🇰🇷"),
    HexRange::new(0x720000, 0x727FFF, "North Korea", "KP", "🇰🇵"),
    HexRange::new(0x728000, 0x72FFFF, "Iraq", "IQ", "🇮🇶"),
    HexRange::new(0x730000, 0x737FFF, "Iran", "IR", "🇮🇷"),
    HexRange::new(0x738000, 0x73FFFF, "Israel", "IL", "🇮🇱"),
    HexRange::new(0x740000, 0x747FFF, "Jordan", "JO", "🇯🇴"),
    HexRange::new(0x748000, 0x74FFFF, "Lebanon", "LB", "🇱🇧"),
    HexRange::new(0x750000, 0x757FFF, "Malaysia", "MY", "🇲🇾"),
    HexRange::new(0x758000, 0x75FFFF, "Philippines", "PH", "🇵🇭"),
    HexRange::new(0x760000, 0x767FFF, "Pakistan", "PK", "🇵🇰"),
    HexRange::new(0x768000, 0x76FFFF, "Singapore", "SG", "🇸🇬"),
    HexRange::new(0x770000, 0x777FFF, "Sri Lanka", "LK", "🇱🇰"),
    HexRange::new(0x778000, 0x77FFFF, "Syria", "SY", "🇸🇾"),
    HexRange::new(0x780000, 0x7BFFFF, "China", "CN", "🇨🇳"),
    HexRange::new(0x7C0000, 0x7FFFFF, "Australia", "AU", "🇦🇺"),
    HexRange::new(0x800000, 0x83FFFF, "India", "IN", "🇮🇳"),
    HexRange::new(0x840000, 0x87FFFF, "Japan", "JP", "🇯🇵"),
    HexRange::new(0x880000, 0x887FFF, "Thailand", "TH", "🇹🇭"),
    HexRange::new(0x888000, 0x88FFFF, "Vietnam", "VN", "🇻🇳"),
    HexRange::new(0x890000, 0x890FFF, "Yemen", "YE", "🇾🇪"),
    HexRange::new(0x894000, 0x894FFF, "Bahrain", "BH", "🇧🇭"),
    HexRange::new(0x895000, 0x8953FF, "Brunei", "BN", "🇧🇳"),
    HexRange::new(0x896000, 0x896FFF, "United Arab Emirates", "AE", "🇦🇪"),
    HexRange::new(0x897000, 0x8973FF, "Solomon Islands", "SB", "🇸🇧"),
    HexRange::new(0x898000, 0x898FFF, "Papua New Guinea", "PG", "🇵🇬"),
    HexRange::new(0x899000, 0x8993FF, "Taiwan", "TW", "🇹🇼"),
    HexRange::new(0x8A0000, 0x8A7FFF, "Indonesia", "ID", "🇮🇩"),
    HexRange::new(0x900000, 0x9003FF, "Marshall Islands", "MH", "🇲🇭"),
    HexRange::new(0x901000, 0x9013FF, "Cook Islands", "CK", "🇨🇰"),
    HexRange::new(0x902000, 0x9023FF, "Samoa", "WS", "🇼🇸"),
    HexRange::new(0xA00000, 0xAFFFFF, "United States", "US", "🇺🇸"),
    HexRange::new(0xC00000, 0xC3FFFF, "Canada", "CA", "🇨🇦"),
    HexRange::new(0xC80000, 0xC87FFF, "New Zealand", "NZ", "🇳🇿"),
    HexRange::new(0xC88000, 0xC88FFF, "Fiji", "FJ", "🇫🇯"),
    HexRange::new(0xC8A000, 0xC8A3FF, "Nauru", "NR", "🇳🇷"),
    HexRange::new(0xC8C000, 0xC8C3FF, "Saint Lucia", "LC", "🇱🇨"),
    HexRange::new(0xC8D000, 0xC8D3FF, "Tonga", "TO", "🇹🇴"),
    HexRange::new(0xC8E000, 0xC8E3FF, "Kiribati", "KI", "🇰🇮"),
    HexRange::new(0xC90000, 0xC903FF, "Vanuatu", "VU", "🇻🇺"),
    HexRange::new(0xE00000, 0xE3FFFF, "Argentina", "AR", "🇦🇷"),
    HexRange::new(0xE40000, 0xE7FFFF, "Brazil", "BR", "🇧🇷"),
    HexRange::new(0xE80000, 0xE80FFF, "Chile", "CL", "🇨🇱"),
    HexRange::new(0xE84000, 0xE84FFF, "Ecuador", "EC", "🇪🇨"),
    HexRange::new(0xE88000, 0xE88FFF, "Paraguay", "PY", "🇵🇾"),
    HexRange::new(0xE8C000, 0xE8CFFF, "Peru", "PE", "🇵🇪"),
    HexRange::new(0xE90000, 0xE90FFF, "Uruguay", "UY", "🇺🇾"),
    HexRange::new(0xE94000, 0xE94FFF, "Bolivia", "BO", "🇧🇴"),
];
