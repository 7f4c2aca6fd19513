//! The sidecar JSON schema: `{ "data": {...}, "CheckSum": ... }`, where
//! `CheckSum` is the variant CRC-16 computed over the serialized bytes of the
//! `data` sub-object alone, independent of the surrounding object's key order.

use crate::crc16::crc16;
use serde::{Deserialize, Serialize};

/// A sentinel used when a sidecar's `opVersion` field is absent. The field is
/// optional for compatibility with caches written before it existed; its
/// absence is accepted with a logged warning rather than rejected.
pub const MISSING_OP_VERSION: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheData {
    pub file_number: i64,
    pub version: i64,
    pub device_id: i64,
    pub model_check_sum: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op_version: Option<i64>,
    pub is_exceed_ram_limit: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sidecar {
    pub data: CacheData,
    #[serde(rename = "CheckSum")]
    pub check_sum: u16,
}

impl Sidecar {
    /// Builds a sidecar, computing `CheckSum` over `data`'s own serialized form.
    pub fn new(data: CacheData) -> serde_json::Result<Self> {
        let check_sum = checksum_of(&data)?;
        Ok(Self { data, check_sum })
    }

    /// Recomputes the checksum over this sidecar's `data` and compares it
    /// against the stored `CheckSum`.
    pub fn checksum_matches(&self) -> serde_json::Result<bool> {
        Ok(checksum_of(&self.data)? == self.check_sum)
    }
}

fn checksum_of(data: &CacheData) -> serde_json::Result<u16> {
    let bytes = serde_json::to_vec(data)?;
    Ok(crc16(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CacheData {
        CacheData {
            file_number: 1,
            version: 1,
            device_id: 1,
            model_check_sum: vec![crc16(&[0x10, 0x20, 0x30, 0x40])],
            op_version: Some(3),
            is_exceed_ram_limit: 0,
        }
    }

    #[test]
    fn round_trips_through_json() {
        let sidecar = Sidecar::new(sample()).unwrap();
        let text = serde_json::to_string(&sidecar).unwrap();
        let parsed: Sidecar = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.data, sidecar.data);
        assert_eq!(parsed.check_sum, sidecar.check_sum);
    }

    #[test]
    fn checksum_matches_freshly_built_sidecar() {
        let sidecar = Sidecar::new(sample()).unwrap();
        assert!(sidecar.checksum_matches().unwrap());
    }

    #[test]
    fn tampered_data_fails_checksum() {
        let mut sidecar = Sidecar::new(sample()).unwrap();
        sidecar.data.version += 1;
        assert!(!sidecar.checksum_matches().unwrap());
    }

    #[test]
    fn missing_op_version_deserializes_as_none() {
        let json = r#"{
            "data": {
                "fileNumber": 1,
                "version": 1,
                "deviceId": 1,
                "modelCheckSum": [1],
                "isExceedRamLimit": 0
            },
            "CheckSum": 0
        }"#;
        let sidecar: Sidecar = serde_json::from_str(json).unwrap();
        assert_eq!(sidecar.data.op_version, None);
    }

    #[test]
    fn missing_ram_limit_field_fails_to_parse() {
        let json = r#"{
            "data": {
                "fileNumber": 1,
                "version": 1,
                "deviceId": 1,
                "modelCheckSum": [1],
                "opVersion": 1
            },
            "CheckSum": 0
        }"#;
        assert!(serde_json::from_str::<Sidecar>(json).is_err());
    }
}
