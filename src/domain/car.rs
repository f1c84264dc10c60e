//! The Car entity: its identifier, the inbound payload and the stored record.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use thiserror::Error;
use utoipa::ToSchema;

/// Length of a car identifier in bytes.
pub const CAR_ID_LEN: usize = 12;

/// Storage-assigned identifier of a car.
///
/// Laid out like a document-database object id:
/// - 4 bytes: big-endian unix seconds at generation time
/// - 5 bytes: random, fixed for the lifetime of the process
/// - 3 bytes: big-endian counter, seeded randomly
///
/// On the wire it is 24 lowercase hex characters; storage keeps the raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarId([u8; CAR_ID_LEN]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCarId {
    #[error("expected {expected} hex characters, got {got}")]
    Length { expected: usize, got: usize },
    #[error("expected {expected} bytes, got {got}")]
    ByteLength { expected: usize, got: usize },
    #[error("not a hex string")]
    NotHex,
}

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(rand::random)
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| AtomicU32::new(rand::random::<u32>()))
        .fetch_add(1, Ordering::Relaxed)
}

impl CarId {
    /// Generates a fresh identifier. Ids generated by one process never repeat
    /// until the 24-bit counter wraps within a single second.
    pub fn generate() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let counter = next_counter();

        let mut bytes = [0u8; CAR_ID_LEN];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        CarId(bytes)
    }

    /// Decodes the storage encoding. Fails when the slice is not exactly 12 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, InvalidCarId> {
        let bytes: [u8; CAR_ID_LEN] = bytes.try_into().map_err(|_| InvalidCarId::ByteLength {
            expected: CAR_ID_LEN,
            got: bytes.len(),
        })?;
        Ok(CarId(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; CAR_ID_LEN] {
        &self.0
    }

    /// Unix seconds embedded in the identifier.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl FromStr for CarId {
    type Err = InvalidCarId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != CAR_ID_LEN * 2 {
            return Err(InvalidCarId::Length {
                expected: CAR_ID_LEN * 2,
                got: s.len(),
            });
        }
        let mut bytes = [0u8; CAR_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidCarId::NotHex)?;
        Ok(CarId(bytes))
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CarId({})", self)
    }
}

impl Serialize for CarId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CarId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Inbound body for create and update.
///
/// Every field defaults to its zero value when omitted, and update replaces all
/// four fields, so an omitted field is stored as `""`, `0` or `0.0`. Any `id`
/// sent by the client is ignored.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(default)]
pub struct CarPayload {
    #[schema(example = "Toyota")]
    pub make: String,
    #[schema(example = "Corolla")]
    pub model: String,
    #[schema(example = 2020)]
    pub year: i32,
    #[schema(example = 19999.99)]
    pub price: f64,
}

/// A stored car as returned to clients.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Car {
    #[schema(value_type = String, example = "65f1c2a9e4b0a1b2c3d4e5f6")]
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
}

impl Car {
    pub fn from_payload(id: CarId, payload: CarPayload) -> Self {
        Car {
            id,
            make: payload.make,
            model: payload.model,
            year: payload.year,
            price: payload.price,
        }
    }

    /// The non-id fields, as they would be submitted by a client.
    pub fn payload(&self) -> CarPayload {
        CarPayload {
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year,
            price: self.price,
        }
    }
}
