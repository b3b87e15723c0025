use crate::domain::{BaselineKind, Season, MONTH_NAMES};

/// Mean baseload of one group, e.g. (Monthly, 2023, March).
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineLevel {
    pub kind: BaselineKind,
    pub year: i32,
    /// Season or month ordinal; `None` for annual levels.
    pub group: Option<u8>,
    pub value: f64,
}

impl BaselineLevel {
    /// Season or month name of the group.
    pub fn group_name(&self) -> Option<&'static str> {
        let position = usize::from(self.group?).checked_sub(1)?;
        match self.kind {
            BaselineKind::Annual => None,
            BaselineKind::Seasonal => Season::ALL.get(position).map(|s| s.name()),
            BaselineKind::Monthly => MONTH_NAMES.get(position).copied(),
        }
    }
}
