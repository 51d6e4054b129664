//! Street name table: five strings per name id

use crate::core::{FacadeError, NameId, Result, INVALID_NAMEID};
use crate::storage::Region;

/// Strings stored for every name id, in slot order
pub const SLOTS_PER_NAME: usize = 5;
const NAME: usize = 0;
const DESTINATIONS: usize = 1;
const PRONUNCIATION: usize = 2;
const REF: usize = 3;
const EXITS: usize = 4;

/// Offsets into one UTF-8 buffer; slot `id * 5 + k` is string `k` of name `id`
#[derive(Debug, Clone, Copy)]
pub struct NameTableView<'r> {
    offsets: &'r [u32],
    values: &'r str,
}

impl<'r> NameTableView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let offsets = region.block::<u32>(&format!("{name}/offsets"))?;
        let bytes = region.raw_block(&format!("{name}/values"))?;
        let values = std::str::from_utf8(bytes).map_err(|e| FacadeError::invalid(name, e.to_string()))?;

        let Some(&last) = offsets.last() else {
            return Err(FacadeError::invalid(name, "offsets have no sentinel entry"));
        };
        if (offsets.len() - 1) % SLOTS_PER_NAME != 0 {
            return Err(FacadeError::invalid(
                name,
                format!("{} strings is not a multiple of {SLOTS_PER_NAME}", offsets.len() - 1),
            ));
        }
        if offsets.windows(2).any(|w| w[0] > w[1]) || last as usize != values.len() {
            return Err(FacadeError::invalid(name, "offsets do not partition the string buffer"));
        }
        if let Some(offset) = offsets.iter().find(|&&o| !values.is_char_boundary(o as usize)) {
            return Err(FacadeError::invalid(
                name,
                format!("offset {offset} splits a UTF-8 sequence"),
            ));
        }
        Ok(Self { offsets, values })
    }

    /// Number of name ids
    pub fn len(&self) -> usize {
        (self.offsets.len() - 1) / SLOTS_PER_NAME
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: NameId, slot: usize) -> &'r str {
        if id == INVALID_NAMEID || id as usize >= self.len() {
            return "";
        }
        let index = id as usize * SLOTS_PER_NAME + slot;
        let begin = self.offsets[index] as usize;
        let end = self.offsets[index + 1] as usize;
        &self.values[begin..end]
    }

    pub fn name(&self, id: NameId) -> &'r str {
        self.slot(id, NAME)
    }

    pub fn destinations(&self, id: NameId) -> &'r str {
        self.slot(id, DESTINATIONS)
    }

    pub fn pronunciation(&self, id: NameId) -> &'r str {
        self.slot(id, PRONUNCIATION)
    }

    pub fn reference(&self, id: NameId) -> &'r str {
        self.slot(id, REF)
    }

    pub fn exits(&self, id: NameId) -> &'r str {
        self.slot(id, EXITS)
    }
}

/// Serializes name records into `(offsets, values)` blocks
pub fn pack_names<'a>(records: impl IntoIterator<Item = [&'a str; SLOTS_PER_NAME]>) -> (Vec<u32>, String) {
    let mut offsets = vec![0u32];
    let mut values = String::new();
    for record in records {
        for value in record {
            values.push_str(value);
            offsets.push(values.len() as u32);
        }
    }
    (offsets, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RegionBuilder;

    fn region() -> Region {
        let (offsets, values) = pack_names([
            ["Rue de la Loi", "Bruxelles", "", "N3", ""],
            ["Ring", "Gent;Antwerpen", "ʁiŋ", "R0", "12"],
        ]);
        let mut builder = RegionBuilder::new();
        builder.add("/names/offsets", &offsets).unwrap();
        builder.add_str("/names/values", &values).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_name_slots() {
        let region = region();
        let names = NameTableView::load(&region, "/names").unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.name(0), "Rue de la Loi");
        assert_eq!(names.reference(0), "N3");
        assert_eq!(names.destinations(1), "Gent;Antwerpen");
        assert_eq!(names.pronunciation(1), "ʁiŋ");
        assert_eq!(names.exits(1), "12");
        assert_eq!(names.pronunciation(0), "");
    }

    #[test]
    fn test_unknown_ids_are_empty() {
        let region = region();
        let names = NameTableView::load(&region, "/names").unwrap();
        assert_eq!(names.name(INVALID_NAMEID), "");
        assert_eq!(names.name(2), "");
    }

    #[test]
    fn test_split_codepoint_rejected() {
        let mut builder = RegionBuilder::new();
        builder.add("/names/offsets", &[0u32, 1, 2, 2, 2, 2]).unwrap();
        builder.add_str("/names/values", "ʁ").unwrap();
        let region = builder.build().unwrap();
        assert!(matches!(
            NameTableView::load(&region, "/names"),
            Err(FacadeError::InvalidDataset { .. })
        ));
    }
}
