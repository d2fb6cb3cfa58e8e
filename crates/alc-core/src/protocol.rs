//! Protocol families used to group and label free-form protocol names.

/// Broad family a protocol name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFamily {
    /// Analog line or mic level.
    Analog,
    /// AES3 / AES/EBU.
    Aes3,
    /// Audinate Dante.
    Dante,
    /// Audio Video Bridging / Milan.
    Avb,
    /// AES67 networked audio.
    Aes67,
    /// Optocore fibre.
    Optocore,
    /// MADI.
    Madi,
    /// Other digital transports.
    Digital,
    /// Unrecognized or missing.
    Unknown,
}

impl ProtocolFamily {
    /// Classifies a protocol name by case-insensitive substring.
    ///
    /// The first matching family wins, checked in declaration order.
    pub fn classify(protocol: Option<&str>) -> Self {
        let Some(protocol) = protocol else {
            return Self::Unknown;
        };
        let name = protocol.to_lowercase();
        const PATTERNS: [(&str, ProtocolFamily); 8] = [
            ("analog", ProtocolFamily::Analog),
            ("aes3", ProtocolFamily::Aes3),
            ("dante", ProtocolFamily::Dante),
            ("avb", ProtocolFamily::Avb),
            ("aes67", ProtocolFamily::Aes67),
            ("optocore", ProtocolFamily::Optocore),
            ("madi", ProtocolFamily::Madi),
            ("digital", ProtocolFamily::Digital),
        ];
        PATTERNS
            .iter()
            .find(|(pattern, _)| name.contains(pattern))
            .map_or(Self::Unknown, |&(_, family)| family)
    }

    /// Short code, e.g. `"ana"` or `"dante"`.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Analog => "ana",
            Self::Aes3 => "aes",
            Self::Dante => "dante",
            Self::Avb => "avb",
            Self::Aes67 => "aes67",
            Self::Optocore => "opto",
            Self::Madi => "madi",
            Self::Digital => "dig",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable family name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Analog => "Analog",
            Self::Aes3 => "AES3",
            Self::Dante => "Dante",
            Self::Avb => "AVB",
            Self::Aes67 => "AES67",
            Self::Optocore => "Optocore",
            Self::Madi => "MADI",
            Self::Digital => "Digital",
            Self::Unknown => "Unknown",
        }
    }
}
