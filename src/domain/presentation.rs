//! Pure mapping from domain enums to display attributes.

use serde::Serialize;

use crate::connectivity::Mode;
use crate::domain::proposal::ProposalStatus;

/// Label, color (hex RGB) and Material icon name for a badge or banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

impl ProposalStatus {
    pub fn badge(&self) -> Badge {
        match self {
            ProposalStatus::Pending => Badge {
                label: "Pending review",
                color: "#FF9800",
                icon: "hourglass_empty",
            },
            ProposalStatus::Approved => Badge {
                label: "Approved",
                color: "#4CAF50",
                icon: "check_circle",
            },
            ProposalStatus::Rejected => Badge {
                label: "Rejected",
                color: "#F44336",
                icon: "cancel",
            },
            ProposalStatus::Applied => Badge {
                label: "Applied",
                color: "#2196F3",
                icon: "done_all",
            },
            ProposalStatus::TestPassed => Badge {
                label: "Tests passed",
                color: "#009688",
                icon: "verified",
            },
            ProposalStatus::TestFailed => Badge {
                label: "Tests failed",
                color: "#FF5722",
                icon: "error",
            },
        }
    }
}

impl Mode {
    pub fn banner(&self) -> Badge {
        match self {
            Mode::Real => Badge {
                label: "Live data",
                color: "#4CAF50",
                icon: "cloud_done",
            },
            Mode::Mock => Badge {
                label: "Offline: showing mock data",
                color: "#FFC107",
                icon: "cloud_off",
            },
        }
    }
}
