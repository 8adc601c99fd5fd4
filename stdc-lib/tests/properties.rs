use chrono::{DateTime, Utc};
use proptest::prelude::*;

use stdc::frame::{DecodedFrame, FRAME_LENGTH};
use stdc::packet::{clean_text, PacketRecord, Payload, Presentation, Renderer, TextFormat};
use stdc::transport::{DatagramCodec, FrameCodec, FrameNumberEncoding, TrailerCodec};

prop_compose! {
    fn arb_frame()(
        payload in prop::collection::vec(any::<u8>(), 0..=FRAME_LENGTH),
        frame_number in any::<u32>(),
        flags in any::<(bool, bool, bool)>(),
        ber in 0.0..=1.0_f64,
    ) -> DecodedFrame {
        let mut frame = DecodedFrame::new(&payload, frame_number).unwrap();
        frame.is_reversed_polarity = flags.0;
        frame.is_mid_stream_reverse_polarity = flags.1;
        frame.is_uncertain = flags.2;
        frame.ber = ber;
        frame
    }
}

prop_compose! {
    fn arb_record()(
        descriptor in any::<u8>(),
        frame_number in any::<u32>(),
        is_decoded in any::<bool>(),
        is_crc in any::<bool>(),
        short_message in prop::option::of("[A-Z ]{0,12}"),
        data in prop::collection::vec(any::<u8>(), 0..32),
        presentation in prop_oneof![Just(0), Just(6), Just(7), Just(3)],
    ) -> PacketRecord {
        let mut rec = PacketRecord::new(descriptor, frame_number, DateTime::<Utc>::UNIX_EPOCH)
            .with_payload(Payload::new(Presentation::from(presentation), &data));
        rec.is_decoded = is_decoded;
        rec.is_crc = is_crc;
        if let Some(msg) = short_message {
            rec = rec.with_var("shortMessage", &msg);
        }
        rec
    }
}

proptest! {
    #[test]
    fn envelope_preserves_frames(frame in arb_frame()) {
        let dat = FrameCodec.encode(&frame).unwrap();
        prop_assert_eq!(dat.len(), FrameCodec::ENCODED_LEN);
        prop_assert_eq!(FrameCodec.decode(&dat).unwrap(), frame);
    }

    #[test]
    fn big_endian_trailer_preserves_payload_and_number(frame in arb_frame()) {
        let codec = TrailerCodec::new(FrameNumberEncoding::BigEndian);
        let decoded = codec.decode(&codec.encode(&frame).unwrap()).unwrap();
        prop_assert_eq!(decoded.payload(), frame.payload());
        prop_assert_eq!(decoded.frame_number, frame.frame_number);
    }

    #[test]
    fn legacy_trailer_keeps_high_bytes(frame in arb_frame()) {
        let codec = TrailerCodec::new(FrameNumberEncoding::Legacy);
        let dat = codec.encode(&frame).unwrap();
        prop_assert_eq!(dat.len(), frame.payload().len() + TrailerCodec::TRAILER_LEN);
        let decoded = codec.decode(&dat).unwrap();
        prop_assert_eq!(decoded.frame_number >> 8, frame.frame_number >> 8);
        prop_assert_eq!(decoded.frame_number & 0xff, (frame.frame_number >> 3) & 0xff);
    }

    #[test]
    fn ineligible_records_never_render(rec in arb_record(), print_all in any::<bool>(), verbose in any::<bool>()) {
        let format = if verbose { TextFormat::Verbose } else { TextFormat::Compact };
        let renderer = Renderer::new(format, print_all);
        let text = renderer.render(&rec);
        let doc = renderer.render_structured(&rec).unwrap();

        if !rec.is_eligible() {
            prop_assert!(text.is_none());
            prop_assert!(doc.is_none());
        } else {
            prop_assert_eq!(text.is_some(), print_all || rec.is_message());
            prop_assert_eq!(doc.is_some(), text.is_some());
        }
    }

    #[test]
    fn clean_text_keeps_printable_ascii(s in "[ -~]*") {
        prop_assert_eq!(clean_text(s.as_bytes(), "\n"), s);
    }

    #[test]
    fn clean_text_only_replaces_line_breaks(s in "[ -~\r\n]*") {
        let expected = s.replace(['\r', '\n'], "<br>");
        prop_assert_eq!(clean_text(s.as_bytes(), "<br>"), expected);
    }

    #[test]
    fn clean_text_escapes_c0_controls(dat in prop::collection::vec(any::<u8>(), 0..64)) {
        let s = clean_text(&dat, "|");
        prop_assert!(s.bytes().all(|b| (0x20..=0x7f).contains(&b)));
    }
}
