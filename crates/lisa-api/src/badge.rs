//! Status badges.

use lisa_state::Status;

/// A static SVG badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub name: &'static str,
    pub svg: &'static str,
}

const NORMAL: Badge = Badge {
    name: "normal",
    svg: include_str!("../assets/normal.svg"),
};
const ERROR: Badge = Badge {
    name: "error",
    svg: include_str!("../assets/error.svg"),
};
const DODGY: Badge = Badge {
    name: "dodgy",
    svg: include_str!("../assets/dodgy.svg"),
};
const MYSTERY: Badge = Badge {
    name: "mystery",
    svg: include_str!("../assets/mystery.svg"),
};
const MAINTENANCE: Badge = Badge {
    name: "maintenance",
    svg: include_str!("../assets/maintenance.svg"),
};
const FAILED: Badge = Badge {
    name: "failed",
    svg: include_str!("../assets/failed.svg"),
};

/// Badge shown for a status. Every status has its own badge.
pub fn badge_for(status: Status) -> Badge {
    match status {
        Status::Up => NORMAL,
        Status::Down => ERROR,
        Status::Dodgy => DODGY,
        Status::Unknown => MYSTERY,
        Status::Maintenance => MAINTENANCE,
        Status::Failed => FAILED,
    }
}
