//! Packet records produced by the frame parser, their classification and
//! rendering.
mod body;
mod descriptor;
mod render;
mod summary;
mod text;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub use body::*;
pub use descriptor::Descriptor;
pub use render::{structured, Renderer, TextFormat};
pub use summary::{DescriptorSummary, Summary};
pub use text::{clean_text, hex_bytes, join_lines};

/// Pre-rendered packet fields keyed by field name, iterated in key order.
///
/// Multi-value fields use `'\n'` between values.
pub type PacketVars = BTreeMap<String, String>;

/// The var holding the human readable descriptor name.
pub const DESCRIPTOR_TEXT_VAR: &str = "packetDescriptorText";

/// How much of a packet the parser was able to decode.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DecodingStage {
    #[default]
    None,
    Partial,
    Complete,
}

impl DecodingStage {
    /// Lowercase name used by the verbose renderer.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Partial => "partial",
            Self::Complete => "complete",
        }
    }
}

/// Payload encoding.
///
/// Serialized as its integer code.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "i32", into = "i32")]
pub enum Presentation {
    /// 7-bit text
    IA5,
    /// 5-bit baudot. There is no renderer for it; it always renders empty.
    ITA2,
    Binary,
    Unknown(i32),
}

impl Presentation {
    /// Code reported when a record has no payload.
    pub const ABSENT: i32 = -1;

    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::IA5 => 0,
            Self::ITA2 => 6,
            Self::Binary => 7,
            Self::Unknown(code) => code,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::IA5 => "IA5",
            Self::ITA2 => "ITA2",
            Self::Binary => "binary",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl From<i32> for Presentation {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::IA5,
            6 => Self::ITA2,
            7 => Self::Binary,
            _ => Self::Unknown(code),
        }
    }
}

impl From<Presentation> for i32 {
    fn from(p: Presentation) -> Self {
        p.code()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub presentation: Presentation,
    pub data: Vec<u8>,
}

impl Payload {
    #[must_use]
    pub fn new(presentation: Presentation, data: &[u8]) -> Self {
        Payload {
            presentation,
            data: data.to_vec(),
        }
    }

    /// False for a payload carrying the [Presentation::ABSENT] code.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.presentation.code() != Presentation::ABSENT
    }
}

fn deserialize_payload<'de, D>(deserializer: D) -> std::result::Result<Option<Payload>, D::Error>
where
    D: Deserializer<'de>,
{
    let payload = Option::<Payload>::deserialize(deserializer)?;
    Ok(payload.filter(Payload::is_present))
}

/// One packet extracted from a decoded frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PacketRecord {
    pub descriptor: u8,
    pub frame_number: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub stage: DecodingStage,
    pub is_decoded: bool,
    pub is_crc: bool,
    /// Packet body length declared by the packet
    #[serde(default)]
    pub packet_length: u32,
    /// A payload with the [Presentation::ABSENT] code is read as `None`.
    #[serde(default, deserialize_with = "deserialize_payload")]
    pub payload: Option<Payload>,
    #[serde(default)]
    pub vars: PacketVars,
}

impl PacketRecord {
    /// Create a decoded, CRC valid, complete record with no payload or vars.
    #[must_use]
    pub fn new(descriptor: u8, frame_number: u32, timestamp: DateTime<Utc>) -> Self {
        PacketRecord {
            descriptor,
            frame_number,
            timestamp,
            stage: DecodingStage::Complete,
            is_decoded: true,
            is_crc: true,
            packet_length: 0,
            payload: None,
            vars: PacketVars::default(),
        }
    }

    #[must_use]
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Only records that fully decoded and passed their CRC are reported.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.is_decoded && self.is_crc
    }

    /// A var value, or an empty string when it is missing.
    #[must_use]
    pub fn var(&self, key: &str) -> &str {
        self.vars.get(key).map_or("", String::as_str)
    }

    #[must_use]
    pub fn has_var(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Descriptor name as given by the parser, empty if absent.
    #[must_use]
    pub fn descriptor_text(&self) -> &str {
        self.var(DESCRIPTOR_TEXT_VAR)
    }

    /// The payload, unless there is none or it carries the absent code.
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref().filter(|p| p.is_present())
    }

    /// Presentation code, or [Presentation::ABSENT] with no payload.
    #[must_use]
    pub fn presentation_code(&self) -> i32 {
        self.payload()
            .map_or(Presentation::ABSENT, |p| p.presentation.code())
    }

    #[must_use]
    pub fn known_descriptor(&self) -> Option<Descriptor> {
        Descriptor::from_u8(self.descriptor)
    }

    /// Typed view of the vars for this record's descriptor.
    #[must_use]
    pub fn body(&self) -> PacketBody<'_> {
        PacketBody::new(self)
    }

    /// Whether this record carries message content worth reporting by default.
    #[must_use]
    pub fn is_message(&self) -> bool {
        self.body().is_message()
    }
}
