//! Profile properties and data source names (single-record datasets)

use bytemuck::{Pod, Zeroable};

use crate::core::{ClassData, FacadeError, Result, MAX_CLASS_INDEX, MAX_EXCLUDABLE_CLASSES};
use crate::storage::Region;

/// Capacity of fixed-size name fields
pub const NAME_FIELD_LEN: usize = 32;
/// Number of data source slots
pub const MAX_DATASOURCES: usize = 32;

/// Routing profile settings as written by the extractor
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct ProfileProperties {
    pub max_speed_for_map_matching: f64,
    pub weight_precision: u32,
    pub continue_straight: u8,
    pub _padding: [u8; 3],
    /// Class mask per exclude index
    pub excludable_classes: [ClassData; MAX_EXCLUDABLE_CLASSES],
    /// Nul-padded class name per class bit
    pub class_names: [[u8; NAME_FIELD_LEN]; MAX_CLASS_INDEX],
    pub weight_name: [u8; NAME_FIELD_LEN],
}

fn fixed_str(field: &[u8]) -> &str {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end]).unwrap_or("")
}

fn check_fixed_str(name: &str, field: &[u8]) -> Result<()> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end])
        .map(|_| ())
        .map_err(|e| FacadeError::invalid(name, e.to_string()))
}

fn fill_fixed(value: &str) -> [u8; NAME_FIELD_LEN] {
    let mut field = [0u8; NAME_FIELD_LEN];
    let mut len = value.len().min(NAME_FIELD_LEN);
    while !value.is_char_boundary(len) {
        len -= 1;
    }
    field[..len].copy_from_slice(&value.as_bytes()[..len]);
    field
}

impl ProfileProperties {
    pub fn new(weight_name: &str, weight_precision: u32) -> Self {
        Self {
            max_speed_for_map_matching: 180.0 / 3.6,
            weight_precision,
            continue_straight: 1,
            weight_name: fill_fixed(weight_name),
            ..Self::zeroed()
        }
    }

    pub fn set_class_name(&mut self, index: usize, name: &str) {
        self.class_names[index] = fill_fixed(name);
    }

    /// Resolves `/common/properties` and checks its text fields
    pub fn load<'r>(region: &'r Region, name: &str) -> Result<&'r Self> {
        let properties = region.value::<Self>(name)?;
        check_fixed_str(name, &properties.weight_name)?;
        for class_name in &properties.class_names {
            check_fixed_str(name, class_name)?;
        }
        Ok(properties)
    }

    pub fn class_name(&self, index: usize) -> &str {
        fixed_str(&self.class_names[index])
    }

    pub fn weight_name(&self) -> &str {
        fixed_str(&self.weight_name)
    }

    pub fn weight_multiplier(&self) -> f64 {
        10f64.powi(self.weight_precision as i32)
    }

    pub fn continue_straight_default(&self) -> bool {
        self.continue_straight != 0
    }

    pub fn exclude_mask(&self, exclude_index: usize) -> Result<ClassData> {
        self.excludable_classes
            .get(exclude_index)
            .copied()
            .ok_or(FacadeError::ExcludeIndexOutOfRange {
                index: exclude_index,
                available: MAX_EXCLUDABLE_CLASSES,
            })
    }
}

/// Indexes of the bits set in `class_data`, lowest first
pub fn class_indexes(class_data: ClassData) -> impl Iterator<Item = usize> {
    (0..MAX_CLASS_INDEX).filter(move |&i| class_data & (1 << i) != 0)
}

/// Names of the sources that supplied segment speeds
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Datasources {
    pub lengths: [u8; MAX_DATASOURCES],
    pub names: [[u8; NAME_FIELD_LEN]; MAX_DATASOURCES],
}

impl Datasources {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut sources = Self::zeroed();
        for (i, name) in names.into_iter().take(MAX_DATASOURCES).enumerate() {
            sources.names[i] = fill_fixed(name);
            sources.lengths[i] = fixed_str(&sources.names[i]).len() as u8;
        }
        sources
    }

    pub fn load<'r>(region: &'r Region, name: &str) -> Result<&'r Self> {
        let sources = region.value::<Self>(name)?;
        for (field, &len) in sources.names.iter().zip(&sources.lengths) {
            if len as usize > NAME_FIELD_LEN {
                return Err(FacadeError::invalid(name, format!("name length {len} overflows its field")));
            }
            check_fixed_str(name, &field[..len as usize])?;
        }
        Ok(sources)
    }

    pub fn source_name(&self, id: u8) -> &str {
        let id = id as usize;
        let len = self.lengths[id] as usize;
        std::str::from_utf8(&self.names[id][..len]).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RegionBuilder;

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<ProfileProperties>(), 312);
        assert_eq!(std::mem::size_of::<Datasources>(), 32 + 32 * 32);
    }

    #[test]
    fn test_profile_properties() {
        let mut properties = ProfileProperties::new("routability", 1);
        properties.set_class_name(0, "toll");
        properties.set_class_name(2, "ferry");
        properties.excludable_classes[1] = 0b101;

        let mut builder = RegionBuilder::new();
        builder.add_value("/common/properties", &properties).unwrap();
        let region = builder.build().unwrap();
        let loaded = ProfileProperties::load(&region, "/common/properties").unwrap();

        assert_eq!(loaded.weight_name(), "routability");
        assert_eq!(loaded.weight_multiplier(), 10.0);
        assert!(loaded.continue_straight_default());
        assert_eq!(loaded.exclude_mask(1).unwrap(), 0b101);
        let names: Vec<_> = class_indexes(0b101).map(|i| loaded.class_name(i)).collect();
        assert_eq!(names, vec!["toll", "ferry"]);
        assert!(matches!(
            loaded.exclude_mask(MAX_EXCLUDABLE_CLASSES),
            Err(FacadeError::ExcludeIndexOutOfRange { index: 8, available: 8 })
        ));
    }

    #[test]
    fn test_datasources() {
        let sources = Datasources::new(["lua profile", "traffic.csv"]);
        assert_eq!(sources.source_name(0), "lua profile");
        assert_eq!(sources.source_name(1), "traffic.csv");
        assert_eq!(sources.source_name(5), "");
    }

    #[test]
    fn test_long_names_are_truncated() {
        let long = "x".repeat(40);
        let properties = ProfileProperties::new(&long, 0);
        assert_eq!(properties.weight_name().len(), NAME_FIELD_LEN);
    }
}
