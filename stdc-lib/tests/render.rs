mod common;

use std::fs;

use stdc::packet::{structured, PacketRecord, Payload, Presentation, Renderer, Summary, TextFormat};
use stdc::stage::{render_records, PacketOutput};

use common::{fixture_path, read_records};

#[test]
fn compact_messages_match_golden_text() {
    let records = read_records("packets.jsonl");
    let mut output = PacketOutput::new(Renderer::default(), Vec::new());
    render_records(records, &mut output).unwrap();

    let text = String::from_utf8(output.into_inner().unwrap()).unwrap();
    let expected = fs::read_to_string(fixture_path("packets_compact.txt")).unwrap();
    assert_eq!(text, expected);
}

#[test]
fn print_all_includes_every_eligible_record() {
    let records = read_records("packets.jsonl");
    let mut output = PacketOutput::new(Renderer::new(TextFormat::Compact, true), Vec::new());
    let summary = render_records(records, &mut output).unwrap();

    let text = String::from_utf8(output.into_inner().unwrap()).unwrap();
    assert_eq!(text.matches("packet:").count(), 8);
    assert_eq!(summary.total, 10);
    assert_eq!(summary.eligible, 8);
    assert_eq!(summary.messages, 4);

    // unknown descriptors get the header only
    assert!(text.contains("packet:                        \n  type:  (99)\n\npacket:"));
    assert!(text.contains("  ULF: 1626.5\n  Services: Maritime Aero\n  Tdm slots: 1 2 3\n"));
    assert!(text.contains("  msgId: 4712 sat: AOR-E les: Burum\n\n"));
    assert!(!text.contains("Multiframe"));
}

#[test]
fn verbose_selects_like_compact() {
    let records = read_records("packets.jsonl");
    let mut output = PacketOutput::new(Renderer::new(TextFormat::Verbose, false), Vec::new());
    render_records(records, &mut output).unwrap();

    let text = String::from_utf8(output.into_inner().unwrap()).unwrap();
    assert_eq!(text.matches("packet:").count(), 4);
    assert!(text.contains("  type: Message (aa)\n  frameNumber: 1\n"));
    assert!(text.contains("      presentation: binary\n      data: {\n          de ad \n      }\n"));
    assert!(text.contains("      shortMessage: \n          OK\n          DONE\n"));
    assert!(!text.contains("packetDescriptorText"));
}

#[test]
fn binary_message_scenario() {
    let rec = PacketRecord::new(0xaa, 1, chrono::Utc::now())
        .with_payload(Payload::new(Presentation::Binary, &[0xde, 0xad]));
    assert!(rec.is_message());
    let text = Renderer::default().render(&rec).unwrap();
    assert!(text.contains("\n     de ad \n"));
}

#[test]
fn unknown_descriptor_scenario() {
    let rec = PacketRecord::new(0x99, 1, chrono::Utc::now());
    assert_eq!(Renderer::new(TextFormat::Compact, false).render(&rec), None);
    assert_eq!(
        Renderer::new(TextFormat::Compact, true).render(&rec).unwrap(),
        "packet:                        \n  type:  (99)\n\n"
    );
    assert!(Renderer::new(TextFormat::Verbose, true)
        .render(&rec)
        .unwrap()
        .contains("  payload: no\n"));
}

#[test]
fn control_byte_scenario() {
    let records = read_records("packets.jsonl");
    let rec = records
        .iter()
        .find(|r| r.frame_number == 5 && r.descriptor == 0xaa)
        .unwrap();

    let text = Renderer::default().render(rec).unwrap();
    assert!(text.contains("     HI(7)\n"));
    let doc = structured(rec).unwrap();
    assert_eq!(doc["payload"]["data"], "HI(7)");
    assert_eq!(doc["payload"]["presentation"], 0);
}

#[test]
fn structured_documents() {
    let records = read_records("packets.jsonl");
    let renderer = Renderer::default();
    let docs: Vec<serde_json::Value> = records
        .iter()
        .filter_map(|r| renderer.render_structured(r).unwrap())
        .collect();

    assert_eq!(docs.len(), 4);
    let egc = &docs[2];
    assert_eq!(egc["packetDescriptor"], 0xb1);
    assert_eq!(egc["packetLength"], 40);
    assert_eq!(egc["decodingStage"], "Complete");
    assert_eq!(egc["payload"]["data"], "SECURITE\n\nNAV WARN");
    assert_eq!(egc["packetVars"]["addressHex"], "0a1b2c");
    assert_eq!(egc["timestamp"], 1_709_294_402_000_000_000_i64);

    let keys: Vec<&String> = egc.as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        vec![
            "decodingStage",
            "frameNumber",
            "packetDescriptor",
            "packetLength",
            "packetVars",
            "payload",
            "timestamp"
        ]
    );
}

#[test]
fn summary_serializes() {
    let mut summary = Summary::default();
    for rec in read_records("packets.jsonl") {
        summary.add(&rec);
    }
    let doc = serde_json::to_value(&summary).unwrap();
    assert_eq!(doc["descriptors"]["170"]["count"], 2);
    assert_eq!(doc["descriptors"]["170"]["bytes"], 30);
    assert_eq!(doc["descriptors"]["153"]["name"], "");
}
