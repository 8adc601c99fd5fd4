use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Descriptor, PacketRecord};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DescriptorSummary {
    /// Descriptor name, empty for unknown descriptors
    pub name: String,
    pub count: usize,
    /// Sum of declared packet lengths
    pub bytes: usize,
}

/// Tracks stats on packet record iteration.
///
/// Per-descriptor stats cover eligible records only.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use stdc::packet::{PacketRecord, Summary};
///
/// let mut summary = Summary::default();
/// summary.add(&PacketRecord::new(0xaa, 1, Utc::now()));
/// assert_eq!(summary.messages, 1);
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Every record seen
    pub total: usize,
    /// Records that decoded and passed CRC
    pub eligible: usize,
    /// Eligible records classified as messages
    pub messages: usize,
    pub descriptors: BTreeMap<u8, DescriptorSummary>,
}

impl Summary {
    pub fn add(&mut self, rec: &PacketRecord) {
        self.total += 1;
        if !rec.is_eligible() {
            return;
        }
        self.eligible += 1;
        if rec.is_message() {
            self.messages += 1;
        }

        let desc = self
            .descriptors
            .entry(rec.descriptor)
            .or_insert_with(|| DescriptorSummary {
                name: Descriptor::from_u8(rec.descriptor)
                    .map(|d| d.name().to_string())
                    .unwrap_or_default(),
                ..Default::default()
            });
        desc.count += 1;
        desc.bytes += rec.packet_length as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn summary() {
        let ts = DateTime::<Utc>::UNIX_EPOCH;
        let mut msg = PacketRecord::new(0xaa, 1, ts);
        msg.packet_length = 10;
        let mut bad = PacketRecord::new(0xaa, 2, ts);
        bad.is_crc = false;
        let mut unknown = PacketRecord::new(0x99, 3, ts);
        unknown.packet_length = 4;

        let mut summary = Summary::default();
        summary.add(&msg);
        summary.add(&msg);
        summary.add(&bad);
        summary.add(&unknown);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.eligible, 3);
        assert_eq!(summary.messages, 2);
        assert_eq!(summary.descriptors.len(), 2);
        assert_eq!(summary.descriptors[&0xaa].name, "Message");
        assert_eq!(summary.descriptors[&0xaa].count, 2);
        assert_eq!(summary.descriptors[&0xaa].bytes, 20);
        assert_eq!(summary.descriptors[&0x99].name, "");
        assert_eq!(summary.descriptors[&0x99].bytes, 4);
    }
}
