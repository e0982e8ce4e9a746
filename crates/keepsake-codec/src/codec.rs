use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// Converts values to opaque bytes and back.
///
/// Implementations must round-trip: `decode(encode(v)) == v` for every value
/// they accept. Encoding failures surface as [`CodecError::Serialization`],
/// decoding failures as [`CodecError::Deserialization`].
pub trait Codec: Send + Sync {
    /// Short, stable name of this codec.
    fn name(&self) -> &'static str;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T>;
}

/// Compact binary codec backed by `bincode`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>> {
        bincode::serialize(value).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Deserialization(e.to_string()))
    }
}

/// JSON codec backed by `serde_json`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Deserialization(e.to_string()))
    }
}

/// Codec chosen by configuration.
///
/// Serializes as its lowercase name and deserializes through [`FromStr`], so
/// names are accepted in any case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    #[default]
    Bincode,
    Json,
}

impl Codec for CodecKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Bincode => BincodeCodec.name(),
            Self::Json => JsonCodec.name(),
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>> {
        match self {
            Self::Bincode => BincodeCodec.encode(value),
            Self::Json => JsonCodec.encode(value),
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        match self {
            Self::Bincode => BincodeCodec.decode(bytes),
            Self::Json => JsonCodec.decode(bytes),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bincode" => Ok(Self::Bincode),
            "json" => Ok(Self::Json),
            other => Err(CodecError::UnknownCodec(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for CodecKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    enum Status {
        Pending,
        Failed { attempts: u32, reason: String },
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct TaskOutput {
        name: String,
        rows: Vec<Vec<f64>>,
        tags: BTreeMap<String, Option<i64>>,
        status: Status,
        parent: Option<Box<TaskOutput>>,
    }

    fn sample() -> TaskOutput {
        let mut tags = BTreeMap::new();
        tags.insert("retries".to_string(), Some(3));
        tags.insert("cache".to_string(), None);
        TaskOutput {
            name: "extract".into(),
            rows: vec![vec![1.0, 2.5], vec![], vec![-0.125]],
            tags,
            status: Status::Failed {
                attempts: 2,
                reason: "timeout".into(),
            },
            parent: Some(Box::new(TaskOutput {
                name: "root".into(),
                rows: vec![],
                tags: BTreeMap::new(),
                status: Status::Pending,
                parent: None,
            })),
        }
    }

    struct Unsupported;

    impl Serialize for Unsupported {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("value cannot be serialized"))
        }
    }

    #[test]
    fn bincode_roundtrips_nested_graph() {
        let bytes = BincodeCodec.encode(&sample()).unwrap();
        let decoded: TaskOutput = BincodeCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn json_roundtrips_nested_graph() {
        let bytes = JsonCodec.encode(&sample()).unwrap();
        let decoded: TaskOutput = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, sample());
        assert!(std::str::from_utf8(&bytes).unwrap().contains("\"extract\""));
    }

    #[test]
    fn codec_kind_dispatches() {
        for kind in [CodecKind::Bincode, CodecKind::Json] {
            let bytes = kind.encode(&42u64).unwrap();
            assert_eq!(kind.decode::<u64>(&bytes).unwrap(), 42);
        }
        assert_eq!(CodecKind::Json.encode(&42u64).unwrap(), b"42");
        assert_eq!(CodecKind::Bincode.encode(&42u64).unwrap(), 42u64.to_le_bytes());
    }

    #[test]
    fn encode_failure_is_serialization_error() {
        for kind in [CodecKind::Bincode, CodecKind::Json] {
            let err = kind.encode(&Unsupported).unwrap_err();
            assert!(matches!(err, CodecError::Serialization(_)), "{kind}: {err}");
        }
    }

    #[test]
    fn truncated_bytes_are_deserialization_error() {
        let bytes = BincodeCodec.encode(&sample()).unwrap();
        let err = BincodeCodec
            .decode::<TaskOutput>(&bytes[..bytes.len() / 2])
            .unwrap_err();
        assert!(matches!(err, CodecError::Deserialization(_)));
    }

    #[test]
    fn foreign_bytes_are_deserialization_error() {
        let json = JsonCodec.encode("hi").unwrap();
        assert!(matches!(
            BincodeCodec.decode::<String>(&json),
            Err(CodecError::Deserialization(_))
        ));

        let bin = BincodeCodec.encode(&42u64).unwrap();
        assert!(matches!(
            JsonCodec.decode::<u64>(&bin),
            Err(CodecError::Deserialization(_))
        ));
    }

    #[test]
    fn codec_kind_from_str() {
        assert_eq!("bincode".parse::<CodecKind>().unwrap(), CodecKind::Bincode);
        assert_eq!("JSON".parse::<CodecKind>().unwrap(), CodecKind::Json);
        assert_eq!(
            "pickle".parse::<CodecKind>(),
            Err(CodecError::UnknownCodec("pickle".into()))
        );
        assert_eq!(CodecKind::default().to_string(), "bincode");
    }

    #[test]
    fn codec_kind_serde_accepts_any_case() {
        assert_eq!(serde_json::from_str::<CodecKind>("\"JSON\"").unwrap(), CodecKind::Json);
        assert_eq!(serde_json::from_str::<CodecKind>("\"Bincode\"").unwrap(), CodecKind::Bincode);
        assert_eq!(serde_json::to_string(&CodecKind::Json).unwrap(), "\"json\"");
        assert!(serde_json::from_str::<CodecKind>("\"pickle\"").is_err());
    }
}
