//! Handle for datasets an extraction may or may not produce

use tracing::{debug, warn};

use crate::core::{FacadeError, Result};
use crate::storage::Region;

/// Feature names reported by [`FacadeError::DatasetDisabled`]
pub const DATASET_TURN_DATA: &str = "TurnData";
pub const DATASET_TURN_LANE_DATA: &str = "NameLaneData";
pub const DATASET_NAME_DATA: &str = "NameData";
pub const DATASET_INTERSECTION_BEARINGS: &str = "IntersectionBearings";
pub const DATASET_ENTRY_CLASS: &str = "EntryClass";

/// A view whose presence was probed once, at load time
#[derive(Debug, Clone, Copy)]
pub struct OptionalDataset<V> {
    feature: &'static str,
    view: Option<V>,
}

impl<V> OptionalDataset<V> {
    pub fn present(feature: &'static str, view: V) -> Self {
        Self {
            feature,
            view: Some(view),
        }
    }

    pub fn disabled(feature: &'static str) -> Self {
        Self { feature, view: None }
    }

    /// Loads the view if `name` is indexed. A present but malformed dataset
    /// still fails the load.
    pub fn probe<'r>(
        region: &'r Region,
        feature: &'static str,
        name: &str,
        load: impl FnOnce(&'r Region, &str) -> Result<V>,
    ) -> Result<Self> {
        if !region.exists(name) {
            warn!(dataset = name, feature, "optional dataset absent");
            return Ok(Self::disabled(feature));
        }
        let view = load(region, name)?;
        debug!(dataset = name, feature, "loaded optional dataset");
        Ok(Self::present(feature, view))
    }

    pub fn get(&self) -> Result<&V> {
        self.view.as_ref().ok_or(FacadeError::DatasetDisabled(self.feature))
    }

    pub fn is_present(&self) -> bool {
        self.view.is_some()
    }

    pub fn feature(&self) -> &'static str {
        self.feature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RegionBuilder;

    #[test]
    fn test_probe() {
        let mut builder = RegionBuilder::new();
        builder.add("/common/turn_data/ids", &[1u32, 2]).unwrap();
        let region = builder.build().unwrap();

        let present = OptionalDataset::probe(&region, DATASET_TURN_DATA, "/common/turn_data", |r, name| {
            r.block::<u32>(&format!("{name}/ids"))
        })
        .unwrap();
        assert!(present.is_present());
        assert_eq!(present.get().unwrap(), &[1, 2]);

        let absent = OptionalDataset::probe(&region, DATASET_NAME_DATA, "/common/names", |r, name| {
            r.block::<u32>(name)
        })
        .unwrap();
        assert!(!absent.is_present());
        assert!(matches!(absent.get(), Err(FacadeError::DatasetDisabled("NameData"))));
    }

    #[test]
    fn test_present_but_broken_fails() {
        let mut builder = RegionBuilder::new();
        builder.add("/common/names/offsets", &[0u8]).unwrap();
        let region = builder.build().unwrap();
        let result = OptionalDataset::probe(&region, DATASET_NAME_DATA, "/common/names", |r, name| {
            r.block::<u32>(&format!("{name}/offsets"))
        });
        assert!(matches!(result, Err(FacadeError::LayoutMismatch { .. })));
    }
}
