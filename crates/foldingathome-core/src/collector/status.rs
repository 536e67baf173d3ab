//! Slot status vocabulary shared by `slot-info` and `queue-info`.

/// Lifecycle status of a slot or queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStatus {
    #[default]
    Unknown,
    Ready,
    Download,
    Running,
    Upload,
    Finishing,
    Stopping,
    Paused,
}

impl SlotStatus {
    /// Interprets status text case-insensitively. Unrecognized text is `Unknown`.
    pub fn parse(text: &str) -> Self {
        match text.to_lowercase().as_str() {
            "ready" => SlotStatus::Ready,
            "download" => SlotStatus::Download,
            "running" => SlotStatus::Running,
            "upload" => SlotStatus::Upload,
            "finishing" => SlotStatus::Finishing,
            "stopping" => SlotStatus::Stopping,
            "paused" => SlotStatus::Paused,
            _ => SlotStatus::Unknown,
        }
    }

    /// Numeric encoding used by `foldingathome_slot_status`.
    pub fn ordinal(self) -> f64 {
        match self {
            SlotStatus::Unknown => 0.0,
            SlotStatus::Ready => 1.0,
            SlotStatus::Download => 2.0,
            SlotStatus::Running => 3.0,
            SlotStatus::Upload => 4.0,
            SlotStatus::Finishing => 5.0,
            SlotStatus::Stopping => 6.0,
            SlotStatus::Paused => 7.0,
        }
    }

    /// Whether the slot is actively folding and reports points per day.
    pub fn is_crunching(self) -> bool {
        matches!(self, SlotStatus::Running | SlotStatus::Finishing)
    }
}
