use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier newtypes for the inventory entities the pipeline reads.
///
/// Identity is owned by the external inventory store; the pipeline only keys
/// derived rows by these values and never mints new ones.
macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(RoadId);
id_type!(SectionId);
id_type!(SegmentId);
id_type!(StructureId);
id_type!(SurveyId);
