use std::fmt::Display;

/// Known packet descriptors.
///
/// Records carry the raw descriptor byte; this is the lookup for the values the
/// parser knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Descriptor {
    AcknowledgementRequest = 0x08,
    LogicalChannelClear = 0x27,
    InboundMessageAck = 0x2a,
    SignallingChannel = 0x6c,
    BulletinBoard = 0x7d,
    Announcement = 0x81,
    LogicalChannelAssignment = 0x83,
    DistressAlertAck = 0x91,
    LoginAck = 0x92,
    EnhancedDataReportAck = 0x9a,
    DistressTestRequest = 0xa0,
    IndividualPoll = 0xa3,
    Confirmation = 0xa8,
    Message = 0xaa,
    LesList = 0xab,
    RequestStatus = 0xac,
    TestResult = 0xad,
    EgcPart1 = 0xb1,
    EgcPart2 = 0xb2,
    MultiframeStart = 0xbd,
    MultiframeContinue = 0xbe,
}

impl Descriptor {
    pub const ALL: [Descriptor; 21] = [
        Self::AcknowledgementRequest,
        Self::LogicalChannelClear,
        Self::InboundMessageAck,
        Self::SignallingChannel,
        Self::BulletinBoard,
        Self::Announcement,
        Self::LogicalChannelAssignment,
        Self::DistressAlertAck,
        Self::LoginAck,
        Self::EnhancedDataReportAck,
        Self::DistressTestRequest,
        Self::IndividualPoll,
        Self::Confirmation,
        Self::Message,
        Self::LesList,
        Self::RequestStatus,
        Self::TestResult,
        Self::EgcPart1,
        Self::EgcPart2,
        Self::MultiframeStart,
        Self::MultiframeContinue,
    ];

    /// Look up a descriptor byte, `None` if unknown.
    #[must_use]
    pub fn from_u8(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AcknowledgementRequest => "Acknowledgement Request",
            Self::LogicalChannelClear => "Logical Channel Clear",
            Self::InboundMessageAck => "Inbound Message Ack.",
            Self::SignallingChannel => "Signalling Channel",
            Self::BulletinBoard => "Bulletin Board",
            Self::Announcement => "Announcement",
            Self::LogicalChannelAssignment => "Logical Channel Assignment",
            Self::DistressAlertAck => "Distress Alert Ack.",
            Self::LoginAck => "Login Ack.",
            Self::EnhancedDataReportAck => "Enhanced Data Report Ack.",
            Self::DistressTestRequest => "Distress Test Request",
            Self::IndividualPoll => "Individual Poll",
            Self::Confirmation => "Confirmation",
            Self::Message => "Message",
            Self::LesList => "LES List",
            Self::RequestStatus => "Request Status",
            Self::TestResult => "Test Result",
            Self::EgcPart1 => "EGC, double header, part 1",
            Self::EgcPart2 => "EGC, double header, part 2",
            Self::MultiframeStart => "Multiframe Packet Start",
            Self::MultiframeContinue => "Multiframe Packet Continue",
        }
    }
}

impl Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:x})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        for d in Descriptor::ALL {
            assert_eq!(Descriptor::from_u8(d.code()), Some(d));
        }
        assert_eq!(Descriptor::from_u8(0x99), None);
        assert_eq!(Descriptor::from_u8(0xaa), Some(Descriptor::Message));
    }

    #[test]
    fn display() {
        assert_eq!(
            Descriptor::EgcPart1.to_string(),
            "EGC, double header, part 1 (b1)"
        );
        assert_eq!(
            Descriptor::AcknowledgementRequest.to_string(),
            "Acknowledgement Request (8)"
        );
    }
}
