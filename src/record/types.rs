use serde::{Deserialize, Deserializer, Serialize};

/// A facility as delivered by a source adapter.
///
/// Field names follow the upstream open-data schema. Unknown fields are ignored, and
/// coordinates are accepted either as JSON numbers or as numeric strings since the
/// remote API and the bulk file disagree on the representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "FACLT_NM", default)]
    pub name: Option<String>,
    #[serde(rename = "SIGUN_NM", default)]
    pub region: Option<String>,
    #[serde(rename = "EMD_NM", default)]
    pub district: Option<String>,
    #[serde(rename = "CRSE_CLASS_NM", default)]
    pub category: Option<String>,
    #[serde(rename = "REPRSNTV_NM", default)]
    pub representative: Option<String>,
    #[serde(rename = "TELNO", default)]
    pub phone: Option<String>,
    #[serde(rename = "REFINE_ROADNM_ADDR", default)]
    pub road_address: Option<String>,
    #[serde(rename = "REFINE_LOTNO_ADDR", default)]
    pub lot_address: Option<String>,
    #[serde(rename = "REFINE_WGS84_LAT", default, deserialize_with = "de_coordinate")]
    pub latitude: Option<f64>,
    #[serde(rename = "REFINE_WGS84_LOGT", default, deserialize_with = "de_coordinate")]
    pub longitude: Option<f64>,
}

/// One facility inside a published snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub region: String,
    pub district: String,
    pub category: String,
    pub representative: Option<String>,
    pub phone: Option<String>,
    /// Road address when present, otherwise the lot-number address.
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Field-abbreviated projection used in static export chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactRecord {
    pub n: String,
    #[serde(default)]
    pub r: String,
    #[serde(default)]
    pub d: String,
    #[serde(default)]
    pub c: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    #[serde(default)]
    pub a: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Record {
    /// Resolves a raw record. Returns `None` when the record has no usable name,
    /// since the name is the lookup key.
    pub fn from_raw(raw: RawRecord) -> Option<Self> {
        let name = raw.name.filter(|n| !n.trim().is_empty())?;
        let address = raw
            .road_address
            .filter(|a| !a.is_empty())
            .or(raw.lot_address)
            .unwrap_or_default();

        Some(Self {
            name,
            region: raw.region.unwrap_or_default(),
            district: raw.district.unwrap_or_default(),
            category: raw.category.unwrap_or_default(),
            representative: raw.representative,
            phone: raw.phone,
            address,
            latitude: raw.latitude,
            longitude: raw.longitude,
        })
    }

    /// True when both coordinates are known and the record can be plotted.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Case-insensitive substring match over every searchable field.
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let fields = [
            Some(self.name.as_str()),
            Some(self.region.as_str()),
            Some(self.district.as_str()),
            Some(self.category.as_str()),
            self.representative.as_deref(),
            self.phone.as_deref(),
            Some(self.address.as_str()),
        ];
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }

    pub fn to_compact(&self) -> CompactRecord {
        CompactRecord {
            n: self.name.clone(),
            r: self.region.clone(),
            d: self.district.clone(),
            c: self.category.clone(),
            p: self.representative.clone(),
            t: self.phone.clone(),
            a: self.address.clone(),
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

impl CompactRecord {
    /// Restores the upstream field names.
    ///
    /// The single resolved address is written to both the road and the lot address
    /// fields. Consumers of the static export have always seen it that way, so the
    /// duplication is kept rather than guessing which of the two it came from.
    pub fn expand(self) -> RawRecord {
        RawRecord {
            name: Some(self.n),
            region: Some(self.r),
            district: Some(self.d),
            category: Some(self.c),
            representative: self.p,
            phone: self.t,
            road_address: Some(self.a.clone()),
            lot_address: Some(self.a),
            latitude: self.lat,
            longitude: self.lng,
        }
    }
}

impl From<&Record> for CompactRecord {
    fn from(record: &Record) -> Self {
        record.to_compact()
    }
}

fn de_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}
