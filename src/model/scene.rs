use glam::Vec3;

/// Opaque reference to a primitive owned by a render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveHandle(pub u32);

/// Geometry a backend knows how to build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle in the XY plane, centered on its origin, facing +Z.
    Plane { width: f32, height: f32 },
}

/// Unlit, single-sided surface color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Basic { color: [f32; 4] },
}

/// A placed primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshNode {
    pub primitive: PrimitiveHandle,
    pub position: Vec3,
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    pub name: String,
    nodes: Vec<MeshNode>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), nodes: Vec::new() }
    }

    pub fn add(&mut self, node: MeshNode) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[MeshNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Scene graph root. Owns every group for the lifetime of the host.
#[derive(Debug, Default)]
pub struct Scene {
    groups: Vec<Group>,
    revision: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, group: Group) {
        self.groups.push(group);
        self.revision += 1;
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Bumped on every insertion; renderers compare it to skip re-uploads.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Nodes of all groups, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &MeshNode> {
        self.groups.iter().flat_map(|g| g.nodes().iter())
    }

    pub fn node_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_tracks_insertions() {
        let mut scene = Scene::new();
        assert_eq!(scene.revision(), 0);

        let mut group = Group::new("board");
        group.add(MeshNode { primitive: PrimitiveHandle(0), position: Vec3::ZERO });
        group.add(MeshNode { primitive: PrimitiveHandle(1), position: Vec3::X });
        scene.add(group);
        scene.add(Group::new("empty"));

        assert_eq!(scene.revision(), 2);
        assert_eq!(scene.node_count(), 2);
        assert_eq!(scene.nodes().count(), 2);
        assert!(scene.group("empty").is_some_and(Group::is_empty));
        assert!(scene.group("missing").is_none());
    }
}
