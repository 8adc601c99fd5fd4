use std::fmt::Write;

use super::{clean_text, hex_bytes, join_lines, Descriptor, PacketRecord, Payload, Presentation};

/// Fields identifying a mobile earth station on a logical channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelFields<'a> {
    pub mes_id: &'a str,
    pub sat_name: &'a str,
    pub les_name: &'a str,
    pub logical_channel_no: &'a str,
}

impl<'a> ChannelFields<'a> {
    fn new(rec: &'a PacketRecord) -> Self {
        ChannelFields {
            mes_id: rec.var("mesId"),
            sat_name: rec.var("satName"),
            les_name: rec.var("lesName"),
            logical_channel_no: rec.var("logicalChannelNo"),
        }
    }
}

/// Poll and confirmation fields, with the optional short message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortMessageFields<'a> {
    pub mes_id: &'a str,
    pub sat_name: &'a str,
    pub les_name: &'a str,
    pub short_message: Option<&'a str>,
}

impl<'a> ShortMessageFields<'a> {
    fn new(rec: &'a PacketRecord) -> Self {
        ShortMessageFields {
            mes_id: rec.var("mesId"),
            sat_name: rec.var("satName"),
            les_name: rec.var("lesName"),
            short_message: rec.vars.get("shortMessage").map(String::as_str),
        }
    }
}

/// Enhanced group call header fields and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EgcFields<'a> {
    pub message_type: &'a str,
    pub service_code_and_address_name: &'a str,
    pub continuation: &'a str,
    pub priority_text: &'a str,
    pub repetition: &'a str,
    pub message_id: &'a str,
    pub packet_no: &'a str,
    pub is_new_payload: &'a str,
    pub address_hex: &'a str,
    pub payload: Option<&'a Payload>,
}

impl<'a> EgcFields<'a> {
    fn new(rec: &'a PacketRecord) -> Self {
        EgcFields {
            message_type: rec.var("messageType"),
            service_code_and_address_name: rec.var("serviceCodeAndAddressName"),
            continuation: rec.var("continuation"),
            priority_text: rec.var("priorityText"),
            repetition: rec.var("repetition"),
            message_id: rec.var("messageId"),
            packet_no: rec.var("packetNo"),
            is_new_payload: rec.var("isNewPayload"),
            address_hex: rec.var("addressHex"),
            payload: rec.payload(),
        }
    }
}

/// Station count and `'\n'` separated station list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationList<'a> {
    pub count: &'a str,
    pub stations: &'a str,
}

/// Typed view of a [PacketRecord], borrowing its vars.
///
/// Vars missing from the record read as empty strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketBody<'a> {
    AcknowledgementRequest {
        sat_name: &'a str,
        les_name: &'a str,
        logical_channel_no: &'a str,
        uplink_channel_mhz: &'a str,
    },
    LogicalChannelClear(ChannelFields<'a>),
    InboundMessageAck(ChannelFields<'a>),
    SignallingChannel {
        uplink_channel_mhz: &'a str,
        services: &'a str,
        tdm_slots: &'a str,
    },
    BulletinBoard {
        network_version: &'a str,
        sat_name: &'a str,
        les_name: &'a str,
        signalling_channel: &'a str,
        count: &'a str,
        channel_type_name: &'a str,
        local: &'a str,
        random_interval: &'a str,
        status: &'a str,
        services: &'a str,
    },
    Announcement {
        channel: ChannelFields<'a>,
        downlink_channel_mhz: &'a str,
        presentation: &'a str,
    },
    LogicalChannelAssignment {
        channel: ChannelFields<'a>,
        status_bits: &'a str,
        frame_length: &'a str,
        duration: &'a str,
        downlink_channel_mhz: &'a str,
        uplink_channel_mhz: &'a str,
        frame_offset: &'a str,
        packet_descriptor_1: &'a str,
    },
    LoginAck {
        login_ack_length: &'a str,
        downlink_channel_mhz: &'a str,
        les: &'a str,
        station_start_hex: &'a str,
        /// Only present when the parser reported a station count
        stations: Option<StationList<'a>>,
    },
    IndividualPoll(ShortMessageFields<'a>),
    Confirmation(ShortMessageFields<'a>),
    Message {
        sat_name: &'a str,
        les_name: &'a str,
        logical_channel_no: &'a str,
        packet_no: &'a str,
        payload: Option<&'a Payload>,
    },
    LesList {
        les_list_length: &'a str,
        station_start_hex: &'a str,
        stations: StationList<'a>,
    },
    EgcPart1(EgcFields<'a>),
    EgcPart2(EgcFields<'a>),
    /// Known descriptor without a compact form.
    Unrendered(Descriptor),
    Unknown(u8),
}

impl<'a> PacketBody<'a> {
    #[must_use]
    pub fn new(rec: &'a PacketRecord) -> Self {
        let Some(descriptor) = rec.known_descriptor() else {
            return Self::Unknown(rec.descriptor);
        };
        match descriptor {
            Descriptor::AcknowledgementRequest => Self::AcknowledgementRequest {
                sat_name: rec.var("satName"),
                les_name: rec.var("lesName"),
                logical_channel_no: rec.var("logicalChannelNo"),
                uplink_channel_mhz: rec.var("uplinkChannelMhz"),
            },
            Descriptor::LogicalChannelClear => Self::LogicalChannelClear(ChannelFields::new(rec)),
            Descriptor::InboundMessageAck => Self::InboundMessageAck(ChannelFields::new(rec)),
            Descriptor::SignallingChannel => Self::SignallingChannel {
                uplink_channel_mhz: rec.var("uplinkChannelMhz"),
                services: rec.var("services"),
                tdm_slots: rec.var("tdmSlots"),
            },
            Descriptor::BulletinBoard => Self::BulletinBoard {
                network_version: rec.var("networkVersion"),
                sat_name: rec.var("satName"),
                les_name: rec.var("lesName"),
                signalling_channel: rec.var("signallingChannel"),
                count: rec.var("count"),
                channel_type_name: rec.var("channelTypeName"),
                local: rec.var("local"),
                random_interval: rec.var("randomInterval"),
                status: rec.var("status"),
                services: rec.var("services"),
            },
            Descriptor::Announcement => Self::Announcement {
                channel: ChannelFields::new(rec),
                downlink_channel_mhz: rec.var("downlinkChannelMhz"),
                presentation: rec.var("presentation"),
            },
            Descriptor::LogicalChannelAssignment => Self::LogicalChannelAssignment {
                channel: ChannelFields::new(rec),
                status_bits: rec.var("status_bits"),
                frame_length: rec.var("frameLength"),
                duration: rec.var("duration"),
                downlink_channel_mhz: rec.var("downlinkChannelMhz"),
                uplink_channel_mhz: rec.var("uplinkChannelMhz"),
                frame_offset: rec.var("frameOffset"),
                packet_descriptor_1: rec.var("packetDescriptor1"),
            },
            Descriptor::LoginAck => Self::LoginAck {
                login_ack_length: rec.var("loginAckLength"),
                downlink_channel_mhz: rec.var("downlinkChannelMhz"),
                les: rec.var("les"),
                station_start_hex: rec.var("stationStartHex"),
                stations: rec.vars.get("stationCount").map(|count| StationList {
                    count: count.as_str(),
                    stations: rec.var("stations"),
                }),
            },
            Descriptor::IndividualPoll => Self::IndividualPoll(ShortMessageFields::new(rec)),
            Descriptor::Confirmation => Self::Confirmation(ShortMessageFields::new(rec)),
            Descriptor::Message => Self::Message {
                sat_name: rec.var("satName"),
                les_name: rec.var("lesName"),
                logical_channel_no: rec.var("logicalChannelNo"),
                packet_no: rec.var("packetNo"),
                payload: rec.payload(),
            },
            Descriptor::LesList => Self::LesList {
                les_list_length: rec.var("lesListLength"),
                station_start_hex: rec.var("stationStartHex"),
                stations: StationList {
                    count: rec.var("stationCount"),
                    stations: rec.var("stations"),
                },
            },
            Descriptor::EgcPart1 => Self::EgcPart1(EgcFields::new(rec)),
            Descriptor::EgcPart2 => Self::EgcPart2(EgcFields::new(rec)),
            Descriptor::DistressAlertAck
            | Descriptor::EnhancedDataReportAck
            | Descriptor::DistressTestRequest
            | Descriptor::RequestStatus
            | Descriptor::TestResult
            | Descriptor::MultiframeStart
            | Descriptor::MultiframeContinue => Self::Unrendered(descriptor),
        }
    }

    /// Polls and confirmations are messages only when they carry a short
    /// message. Message and EGC packets always are.
    #[must_use]
    pub fn is_message(&self) -> bool {
        match self {
            Self::IndividualPoll(f) | Self::Confirmation(f) => f.short_message.is_some(),
            Self::Message { .. } | Self::EgcPart1(_) | Self::EgcPart2(_) => true,
            _ => false,
        }
    }

    /// Append the compact form of this body to `out`. Unknown and unrendered
    /// descriptors append nothing.
    pub fn write_compact(&self, out: &mut String) {
        match *self {
            Self::AcknowledgementRequest {
                sat_name,
                les_name,
                logical_channel_no,
                uplink_channel_mhz,
            } => labelled(
                out,
                &[
                    ("sat", sat_name),
                    ("les", les_name),
                    ("LCN", logical_channel_no),
                    ("ULF", uplink_channel_mhz),
                ],
            ),
            Self::LogicalChannelClear(c) | Self::InboundMessageAck(c) => labelled(
                out,
                &[
                    ("msgId", c.mes_id),
                    ("sat", c.sat_name),
                    ("les", c.les_name),
                    ("LCN", c.logical_channel_no),
                ],
            ),
            Self::SignallingChannel {
                uplink_channel_mhz,
                services,
                tdm_slots,
            } => {
                labelled(out, &[("ULF", uplink_channel_mhz)]);
                joined(out, "  Services: ", services);
                joined(out, "  Tdm slots: ", tdm_slots);
            }
            Self::BulletinBoard {
                network_version,
                sat_name,
                les_name,
                signalling_channel,
                count,
                channel_type_name,
                local,
                random_interval,
                status,
                services,
            } => {
                labelled(
                    out,
                    &[
                        ("netVer", network_version),
                        ("sat", sat_name),
                        ("les", les_name),
                        ("sigCh", signalling_channel),
                        ("count", count),
                        ("chType", channel_type_name),
                        ("sat", sat_name),
                        ("local", local),
                        ("randInt", random_interval),
                    ],
                );
                joined(out, "  Status: ", status);
                joined(out, "  Services: ", services);
            }
            Self::Announcement {
                channel: c,
                downlink_channel_mhz,
                presentation,
            } => labelled(
                out,
                &[
                    ("msgId", c.mes_id),
                    ("sat", c.sat_name),
                    ("les", c.les_name),
                    ("LCN", c.logical_channel_no),
                    ("dlFr", downlink_channel_mhz),
                    ("pres", presentation),
                ],
            ),
            Self::LogicalChannelAssignment {
                channel: c,
                status_bits,
                frame_length,
                duration,
                downlink_channel_mhz,
                uplink_channel_mhz,
                frame_offset,
                packet_descriptor_1,
            } => labelled(
                out,
                &[
                    ("msgId", c.mes_id),
                    ("sat", c.sat_name),
                    ("les", c.les_name),
                    ("status", status_bits),
                    ("LCN", c.logical_channel_no),
                    ("frLen", frame_length),
                    ("dur", duration),
                    ("dlFr", downlink_channel_mhz),
                    ("ulFr", uplink_channel_mhz),
                    ("frOffs", frame_offset),
                    ("PD1", packet_descriptor_1),
                ],
            ),
            Self::LoginAck {
                login_ack_length,
                downlink_channel_mhz,
                les,
                station_start_hex,
                stations,
            } => {
                labelled(
                    out,
                    &[
                        ("loginAckLen", login_ack_length),
                        ("dlFr", downlink_channel_mhz),
                        ("les", les),
                        ("stStartHex", station_start_hex),
                    ],
                );
                if let Some(list) = stations {
                    let _ = write!(out, "  stationCnt: {} ", list.count);
                    joined(out, "Stations: ", list.stations);
                }
            }
            Self::IndividualPoll(f) | Self::Confirmation(f) => {
                labelled(
                    out,
                    &[("msgId", f.mes_id), ("sat", f.sat_name), ("les", f.les_name)],
                );
                if let Some(msg) = f.short_message {
                    out.push_str("  Short message: \n      ");
                    out.push_str(&clean_text(msg.as_bytes(), "\n     "));
                    out.push('\n');
                }
            }
            Self::Message {
                sat_name,
                les_name,
                logical_channel_no,
                packet_no,
                payload,
            } => {
                labelled(
                    out,
                    &[
                        ("sat", sat_name),
                        ("les", les_name),
                        ("LCN", logical_channel_no),
                        ("packetNo", packet_no),
                    ],
                );
                let _ = write!(out, "  Message({}): \n     ", content_kind(payload));
                out.push_str(&message_content(payload));
                out.push('\n');
            }
            Self::LesList {
                les_list_length,
                station_start_hex,
                stations,
            } => {
                labelled(
                    out,
                    &[
                        ("lesListLen", les_list_length),
                        ("stStartHex", station_start_hex),
                        ("stCnt", stations.count),
                    ],
                );
                joined(out, " Stations: ", stations.stations);
            }
            Self::EgcPart1(f) | Self::EgcPart2(f) => {
                labelled(
                    out,
                    &[
                        ("msgType", f.message_type),
                        ("svcCd&AddrName", f.service_code_and_address_name),
                        ("contin", f.continuation),
                        ("prio", f.priority_text),
                        ("rep", f.repetition),
                        ("msgId", f.message_id),
                        ("packetNo", f.packet_no),
                        ("isNewPayl", f.is_new_payload),
                        ("addrHex", f.address_hex),
                    ],
                );
                let _ = write!(out, "  Payload({}): \n     ", content_kind(f.payload));
                out.push_str(&egc_content(f.payload));
                out.push('\n');
            }
            Self::Unrendered(_) | Self::Unknown(_) => {}
        }
    }

    /// Compact form of this body as a new string.
    #[must_use]
    pub fn compact(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }
}

/// One line of `label: value` pairs.
fn labelled(out: &mut String, fields: &[(&str, &str)]) {
    out.push_str("  ");
    for (idx, (label, value)) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{label}: {value}");
    }
    out.push('\n');
}

fn joined(out: &mut String, prefix: &str, value: &str) {
    out.push_str(prefix);
    out.push_str(&join_lines(value));
    out.push('\n');
}

fn content_kind(payload: Option<&Payload>) -> &'static str {
    match payload.map(|p| p.presentation) {
        Some(Presentation::Binary) => "hex",
        _ => "text",
    }
}

fn payload_data(payload: Option<&Payload>) -> &[u8] {
    match payload {
        Some(p) => &p.data,
        None => &[],
    }
}

fn message_content(payload: Option<&Payload>) -> String {
    let dat = payload_data(payload);
    match payload.map(|p| p.presentation) {
        Some(Presentation::IA5) => clean_text(dat, "\n         "),
        Some(Presentation::ITA2) => String::new(),
        _ => hex_bytes(dat),
    }
}

fn egc_content(payload: Option<&Payload>) -> String {
    let dat = payload_data(payload);
    match payload.map(|p| p.presentation) {
        Some(Presentation::Binary) => hex_bytes(dat),
        Some(Presentation::ITA2) => String::new(),
        _ => clean_text(dat, "\n     "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use test_case::test_case;

    fn record(descriptor: u8, vars: &[(&str, &str)]) -> PacketRecord {
        let mut rec = PacketRecord::new(descriptor, 1, DateTime::<Utc>::UNIX_EPOCH);
        for (k, v) in vars {
            rec = rec.with_var(k, v);
        }
        rec
    }

    #[test_case(0xaa, &[], true; "message")]
    #[test_case(0xb1, &[], true; "egc part 1")]
    #[test_case(0xb2, &[], true; "egc part 2")]
    #[test_case(0xa3, &[], false; "poll without short message")]
    #[test_case(0xa3, &[("shortMessage", "")], true; "poll with empty short message")]
    #[test_case(0xa8, &[("shortMessage", "HI")], true; "confirmation with short message")]
    #[test_case(0xa8, &[("mesId", "1")], false; "confirmation without short message")]
    #[test_case(0x08, &[], false; "ack request")]
    #[test_case(0x91, &[], false; "unrendered")]
    #[test_case(0x99, &[], false; "unknown")]
    fn message_classification(descriptor: u8, vars: &[(&str, &str)], expected: bool) {
        assert_eq!(record(descriptor, vars).is_message(), expected);
    }

    #[test]
    fn body_variants() {
        assert_eq!(record(0x99, &[]).body(), PacketBody::Unknown(0x99));
        assert_eq!(
            record(0xbd, &[]).body(),
            PacketBody::Unrendered(Descriptor::MultiframeStart)
        );
        assert!(matches!(
            record(0x27, &[("mesId", "42")]).body(),
            PacketBody::LogicalChannelClear(ChannelFields { mes_id: "42", .. })
        ));
    }

    #[test_case(0x08, &[("satName", "AOR-E"), ("lesName", "Burum"), ("logicalChannelNo", "3"), ("uplinkChannelMhz", "1640.5")],
        "  sat: AOR-E les: Burum LCN: 3 ULF: 1640.5\n"; "ack request")]
    #[test_case(0x27, &[("mesId", "1"), ("satName", "S"), ("lesName", "L"), ("logicalChannelNo", "2")],
        "  msgId: 1 sat: S les: L LCN: 2\n"; "channel clear")]
    #[test_case(0x2a, &[("mesId", "1")],
        "  msgId: 1 sat:  les:  LCN: \n"; "inbound ack with missing vars")]
    #[test_case(0x6c, &[("uplinkChannelMhz", "1.5"), ("services", "a\nb"), ("tdmSlots", "1\n2\n3")],
        "  ULF: 1.5\n  Services: a b\n  Tdm slots: 1 2 3\n"; "signalling channel")]
    #[test_case(0x7d, &[("networkVersion", "1"), ("satName", "S"), ("lesName", "L"), ("signallingChannel", "4"),
        ("count", "5"), ("channelTypeName", "NCS"), ("local", "0"), ("randomInterval", "7"), ("status", "x\ny"), ("services", "z")],
        "  netVer: 1 sat: S les: L sigCh: 4 count: 5 chType: NCS sat: S local: 0 randInt: 7\n  Status: x y\n  Services: z\n"; "bulletin board")]
    #[test_case(0x81, &[("mesId", "1"), ("satName", "S"), ("lesName", "L"), ("logicalChannelNo", "2"),
        ("downlinkChannelMhz", "1537.7"), ("presentation", "IA5")],
        "  msgId: 1 sat: S les: L LCN: 2 dlFr: 1537.7 pres: IA5\n"; "announcement")]
    #[test_case(0x83, &[("mesId", "1"), ("satName", "S"), ("lesName", "L"), ("status_bits", "01"), ("logicalChannelNo", "2"),
        ("frameLength", "3"), ("duration", "4"), ("downlinkChannelMhz", "5"), ("uplinkChannelMhz", "6"),
        ("frameOffset", "7"), ("packetDescriptor1", "8")],
        "  msgId: 1 sat: S les: L status: 01 LCN: 2 frLen: 3 dur: 4 dlFr: 5 ulFr: 6 frOffs: 7 PD1: 8\n"; "channel assignment")]
    #[test_case(0x92, &[("loginAckLength", "9"), ("downlinkChannelMhz", "1"), ("les", "L"), ("stationStartHex", "0a")],
        "  loginAckLen: 9 dlFr: 1 les: L stStartHex: 0a\n"; "login ack without stations")]
    #[test_case(0x92, &[("stationCount", "2"), ("stations", "A\nB")],
        "  loginAckLen:  dlFr:  les:  stStartHex: \n  stationCnt: 2 Stations: A B\n"; "login ack with stations")]
    #[test_case(0xa3, &[("mesId", "1"), ("satName", "S"), ("lesName", "L")],
        "  msgId: 1 sat: S les: L\n"; "poll without short message")]
    #[test_case(0xa8, &[("mesId", "1"), ("satName", "S"), ("lesName", "L"), ("shortMessage", "HI\nTHERE\u{7}")],
        "  msgId: 1 sat: S les: L\n  Short message: \n      HI\n     THERE(7)\n"; "confirmation with short message")]
    #[test_case(0xab, &[("lesListLength", "3"), ("stationStartHex", "1f"), ("stationCount", "2"), ("stations", "A\nB")],
        "  lesListLen: 3 stStartHex: 1f stCnt: 2\n Stations: A B\n"; "les list")]
    #[test_case(0x91, &[("satName", "S")], ""; "distress alert ack")]
    #[test_case(0xbe, &[], ""; "multiframe continue")]
    #[test_case(0x99, &[("satName", "S")], ""; "unknown")]
    fn compact(descriptor: u8, vars: &[(&str, &str)], expected: &str) {
        assert_eq!(record(descriptor, vars).body().compact(), expected);
    }

    #[test_case(Presentation::Binary, &[0xde, 0xad], "  Message(hex): \n     de ad \n"; "binary")]
    #[test_case(Presentation::IA5, b"AB\r\nC", "  Message(text): \n     AB\n         \n         C\n"; "ia5")]
    #[test_case(Presentation::ITA2, &[0x01, 0x02], "  Message(text): \n     \n"; "ita2 renders empty")]
    #[test_case(Presentation::Unknown(3), &[0x0f], "  Message(text): \n     f \n"; "unknown presentation is hex")]
    fn message_payload(presentation: Presentation, dat: &[u8], expected: &str) {
        let rec = record(0xaa, &[("satName", "S"), ("lesName", "L"), ("logicalChannelNo", "1"), ("packetNo", "2")])
            .with_payload(Payload::new(presentation, dat));
        let expected = format!("  sat: S les: L LCN: 1 packetNo: 2\n{expected}");
        assert_eq!(rec.body().compact(), expected);
    }

    #[test]
    fn message_without_payload() {
        let rec = record(0xaa, &[]);
        assert_eq!(
            rec.body().compact(),
            "  sat:  les:  LCN:  packetNo: \n  Message(text): \n     \n"
        );
    }

    #[test_case(Presentation::Binary, &[0x01, 0xff], "  Payload(hex): \n     1 ff \n"; "binary")]
    #[test_case(Presentation::IA5, b"A\nB", "  Payload(text): \n     A\n     B\n"; "ia5")]
    #[test_case(Presentation::Unknown(9), b"A\x02", "  Payload(text): \n     A(2)\n"; "other presentations are text")]
    #[test_case(Presentation::ITA2, b"AB", "  Payload(text): \n     \n"; "ita2 renders empty")]
    fn egc_payload(presentation: Presentation, dat: &[u8], expected: &str) {
        let rec = record(
            0xb2,
            &[
                ("messageType", "t"),
                ("serviceCodeAndAddressName", "n"),
                ("continuation", "c"),
                ("priorityText", "p"),
                ("repetition", "r"),
                ("messageId", "m"),
                ("packetNo", "k"),
                ("isNewPayload", "i"),
                ("addressHex", "a"),
            ],
        )
        .with_payload(Payload::new(presentation, dat));
        let expected = format!(
            "  msgType: t svcCd&AddrName: n contin: c prio: p rep: r msgId: m packetNo: k isNewPayl: i addrHex: a\n{expected}"
        );
        assert_eq!(rec.body().compact(), expected);
    }
}
