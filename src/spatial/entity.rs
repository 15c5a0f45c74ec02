use inlinable_string::InlinableString;

/// Compact descriptor of the externally-owned record a node is linked to.
/// This is what travels on the wire in place of the live reference.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub name: InlinableString,
    pub kind: InlinableString,
}

/// Legacy 2d placement fields layered onto a node's 3d transform, used by
/// flat content placed in the scene.
///
/// The fields compose into the world matrix as an extra scale/translate
/// term; the scale is divided by the accumulated scale of linked ancestors
/// so nested content does not shrink or grow exponentially with depth.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinkedEntity {
    pub info: EntityInfo,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub scale: Option<f32>,
}

impl LinkedEntity {
    pub fn new(info: EntityInfo) -> Self {
        LinkedEntity {
            info,
            x: None,
            y: None,
            scale: None,
        }
    }

    /// The effective placement with absent fields defaulted.
    #[inline]
    pub(crate) fn placement(&self) -> (f32, f32, f32) {
        (
            self.x.unwrap_or(0.0),
            self.y.unwrap_or(0.0),
            self.scale.unwrap_or(1.0),
        )
    }
}
