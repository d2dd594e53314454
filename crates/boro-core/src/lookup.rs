//! Callsign lookup record.

use serde::{Deserialize, Deserializer, Serialize};

/// Declares [`LookupResult`] from the list of optional wire fields, together
/// with the name-based accessor used by templates.
macro_rules! lookup_fields {
    ($( $(#[$doc:meta])* $field:ident => $wire:literal ),+ $(,)?) => {
        /// Directory record for one callsign.
        ///
        /// `call` is the only required field. Everything else is an optional
        /// string exactly as the service sent it; no numeric or date
        /// coercion happens here. Blank elements deserialize as `None`.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct LookupResult {
            /// The callsign the record belongs to.
            #[serde(default)]
            pub call: String,
            $(
                $(#[$doc])*
                #[serde(
                    rename = $wire,
                    default,
                    deserialize_with = "non_empty",
                    skip_serializing_if = "Option::is_none"
                )]
                pub $field: Option<String>,
            )+
        }

        impl LookupResult {
            /// Wire names of every field, `call` first.
            pub const FIELD_NAMES: &'static [&'static str] = &["call", $($wire),+];

            /// Get a field by its wire name.
            ///
            /// Returns `None` for unknown names and for absent fields.
            pub fn field(&self, name: &str) -> Option<&str> {
                match name {
                    "call" => Some(self.call.as_str()),
                    $($wire => self.$field.as_deref(),)+
                    _ => None,
                }
            }
        }
    };
}

lookup_fields! {
    /// Other callsigns that resolve to this record.
    aliases => "aliases",
    /// DXCC entity ID.
    dxcc => "dxcc",
    /// First name.
    fname => "fname",
    /// Last name.
    name => "name",
    /// Street address.
    addr1 => "addr1",
    /// City.
    addr2 => "addr2",
    state => "state",
    zip => "zip",
    country => "country",
    /// Country code for the mailing address.
    ccode => "ccode",
    lat => "lat",
    lon => "lon",
    /// Maidenhead grid locator.
    grid => "grid",
    county => "county",
    fips => "fips",
    /// DXCC country name.
    land => "land",
    /// License effective date.
    efdate => "efdate",
    /// License expiration date.
    expdate => "expdate",
    /// Previous callsign.
    p_call => "p_call",
    /// License class.
    class => "class",
    codes => "codes",
    /// QSL manager information.
    qslmgr => "qslmgr",
    email => "email",
    /// Web page.
    url => "url",
    u_views => "u_views",
    bio => "bio",
    /// Primary image URL.
    image => "image",
    serial => "serial",
    /// Last modification time of the record.
    moddate => "moddate",
    msa => "MSA",
    area_code => "AreaCode",
    time_zone => "TimeZone",
    gmt_offset => "GMTOffset",
    dst => "DST",
    eqsl => "eqsl",
    mqsl => "mqsl",
    cqzone => "cqzone",
    ituzone => "ituzone",
    /// How the coordinates were derived.
    geoloc => "geoloc",
    attn => "attn",
    nickname => "nickname",
    /// Combined full name as the operator prefers it.
    name_fmt => "name_fmt",
    born => "born",
}

impl LookupResult {
    /// Create a record with only the callsign set.
    pub fn new(call: impl Into<String>) -> Self {
        Self {
            call: call.into(),
            ..Default::default()
        }
    }

    /// Returns the operator's name for display.
    ///
    /// Prefers `name_fmt`, then `fname name`.
    pub fn display_name(&self) -> Option<String> {
        if let Some(formatted) = self.name_fmt.as_deref().filter(|s| !s.is_empty()) {
            return Some(formatted.to_string());
        }

        let parts: Vec<&str> = [self.fname.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();

        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// Deserialize an optional string, treating blank text as absent.
pub fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}
