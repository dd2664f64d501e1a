use strum::Display;

/// Where a hart is in the boot sequence.
///
/// The order is strictly linear except for the election branch, which sends every
/// hart but the boot hart straight to [`BootStage::Idle`]. There is no error stage:
/// faults go to the trap vector once it is installed.
#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BootStage {
    Electing,
    #[strum(to_string = "ClearingBSS")]
    ClearingBss,
    AwaitingEarlyInit,
    AwaitingMain,
    Idle,
}

impl BootStage {
    /// The stage that follows a successful step. `Idle` has none.
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Electing => Some(Self::ClearingBss),
            Self::ClearingBss => Some(Self::AwaitingEarlyInit),
            Self::AwaitingEarlyInit => Some(Self::AwaitingMain),
            Self::AwaitingMain => Some(Self::Idle),
            Self::Idle => None,
        }
    }

    /// Whether `next` is a legal move from `self`.
    pub const fn can_move_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Electing, Self::Idle) => true,
            _ => match self.successor() {
                Some(successor) => successor as u8 == next as u8,
                None => false,
            },
        }
    }
}
