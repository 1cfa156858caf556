use bitflags::bitflags;

bitflags! {
    /// Why a waypoint is drawn. Declaration order is precedence order:
    /// a waypoint shows in the first of its visible roles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct RenderRole: u8 {
        const HIGHLIGHT = 1;
        const FLIGHT_PLAN_ACTIVE = 1 << 1;
        const FLIGHT_PLAN_INACTIVE = 1 << 2;
        const NORMAL = 1 << 3;
        const AIRWAY = 1 << 4;
        const VNAV = 1 << 5;
    }
}

impl RenderRole {
    /// Single roles, highest precedence first.
    pub const PRECEDENCE: [RenderRole; 6] = [
        RenderRole::HIGHLIGHT,
        RenderRole::FLIGHT_PLAN_ACTIVE,
        RenderRole::FLIGHT_PLAN_INACTIVE,
        RenderRole::NORMAL,
        RenderRole::AIRWAY,
        RenderRole::VNAV,
    ];

    /// The single roles contained in `self`, highest precedence first.
    pub fn singles(self) -> impl Iterator<Item = RenderRole> {
        Self::PRECEDENCE
            .into_iter()
            .filter(move |role| self.contains(*role))
    }

    pub fn is_single(self) -> bool {
        self.bits().count_ones() == 1
    }
}
