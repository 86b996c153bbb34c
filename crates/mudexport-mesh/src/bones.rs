//! Skeleton and bone structures

use mudexport_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Identity rotation quaternion (x, y, z, w)
pub const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Skeleton driving a skinned mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skeleton {
    /// All bones, parents referenced by index
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Create a new empty skeleton
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone to the skeleton and return its index
    pub fn add_bone(&mut self, bone: Bone) -> usize {
        let idx = self.bones.len();
        self.bones.push(bone);
        idx
    }

    /// Get bone count
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Get bone by index
    pub fn get_bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// Indices of bones without a parent, in bone order
    pub fn root_bones(&self) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Get children of a bone, in bone order
    pub fn children(&self, bone_index: usize) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent == Some(bone_index))
            .map(|(i, _)| i)
            .collect()
    }

    /// Child lists for every bone, built in one pass
    ///
    /// Entry `i` holds the children of bone `i` in bone order. Parents out of
    /// range are skipped; `validate` reports them.
    pub fn child_lists(&self) -> Vec<Vec<usize>> {
        let mut lists = vec![Vec::new(); self.bones.len()];
        for (idx, bone) in self.bones.iter().enumerate() {
            if let Some(list) = bone.parent.and_then(|p| lists.get_mut(p)) {
                list.push(idx);
            }
        }
        lists
    }

    /// Validate skeleton structure
    ///
    /// Every parent index must be in range and following parents from any
    /// bone must reach a root.
    pub fn validate(&self) -> Result<()> {
        self.depths().map(|_| ())
    }

    /// Hierarchy depth of every bone, roots at 1
    ///
    /// Fails like `validate` on a broken hierarchy. Each bone is visited once.
    pub fn depths(&self) -> Result<Vec<usize>> {
        const UNKNOWN: usize = 0;
        const ON_PATH: usize = usize::MAX;

        let mut depths = vec![UNKNOWN; self.bones.len()];
        let mut path = Vec::new();

        for start in 0..self.bones.len() {
            let mut current = Some(start);
            let mut base = 0;

            while let Some(idx) = current {
                match depths[idx] {
                    UNKNOWN => {
                        depths[idx] = ON_PATH;
                        path.push(idx);
                        current = self.parent_of(idx)?;
                    }
                    ON_PATH => {
                        return Err(Error::invalid_data(format!(
                            "bone {} ({}) is part of a parent cycle",
                            idx, self.bones[idx].name
                        )));
                    }
                    known => {
                        base = known;
                        current = None;
                    }
                }
            }

            for idx in path.drain(..).rev() {
                base += 1;
                depths[idx] = base;
            }
        }

        Ok(depths)
    }

    fn parent_of(&self, idx: usize) -> Result<Option<usize>> {
        let bone = &self.bones[idx];
        match bone.parent {
            Some(parent) if parent >= self.bones.len() => Err(Error::invalid_data(format!(
                "bone {} ({}) has parent index {} out of range",
                idx, bone.name, parent
            ))),
            parent => Ok(parent),
        }
    }
}

/// A single bone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bone {
    /// Bone name
    pub name: String,
    /// Parent bone index (None for root)
    pub parent: Option<usize>,
    /// Rest translation relative to the parent
    pub translation: [f32; 3],
    /// Rest rotation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl Bone {
    /// Create a bone at the parent's origin with no rotation
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            translation: [0.0; 3],
            rotation: IDENTITY_ROTATION,
        }
    }

    /// Check if this is a root bone
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_skeleton() -> Skeleton {
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(Bone::new("root", None));
        skeleton.add_bone(Bone::new("spine", Some(0)));
        skeleton.add_bone(Bone::new("leg_l", Some(0)));
        skeleton.add_bone(Bone::new("head", Some(1)));
        skeleton
    }

    #[test]
    fn test_hierarchy() {
        let skeleton = make_test_skeleton();
        assert_eq!(skeleton.bone_count(), 4);
        assert_eq!(skeleton.root_bones(), vec![0]);
        assert_eq!(skeleton.children(0), vec![1, 2]);
        assert_eq!(skeleton.children(1), vec![3]);
        assert!(skeleton.children(3).is_empty());
        assert!(skeleton.get_bone(0).unwrap().is_root());
    }

    #[test]
    fn test_validate_ok() {
        assert!(make_test_skeleton().validate().is_ok());
    }

    #[test]
    fn test_validate_parent_out_of_range() {
        let mut skeleton = make_test_skeleton();
        skeleton.add_bone(Bone::new("stray", Some(42)));

        let err = skeleton.validate().unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_validate_cycle() {
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(Bone::new("a", Some(1)));
        skeleton.add_bone(Bone::new("b", Some(0)));

        let err = skeleton.validate().unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_child_lists() {
        let skeleton = make_test_skeleton();
        assert_eq!(skeleton.child_lists(), vec![vec![1, 2], vec![3], vec![], vec![]]);
    }

    #[test]
    fn test_depths() {
        assert_eq!(make_test_skeleton().depths().unwrap(), vec![1, 2, 2, 3]);
    }

    #[test]
    fn test_depths_of_long_chain() {
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(Bone::new("b0", None));
        for i in 1..50_000 {
            skeleton.add_bone(Bone::new(format!("b{i}"), Some(i - 1)));
        }

        let depths = skeleton.depths().unwrap();
        assert_eq!(depths[0], 1);
        assert_eq!(depths[49_999], 50_000);
    }

    #[test]
    fn test_cycle_behind_valid_bones() {
        let mut skeleton = Skeleton::new();
        skeleton.add_bone(Bone::new("leaf", Some(1)));
        skeleton.add_bone(Bone::new("a", Some(2)));
        skeleton.add_bone(Bone::new("b", Some(1)));

        assert!(skeleton.validate().unwrap_err().to_string().contains("cycle"));
    }
}
