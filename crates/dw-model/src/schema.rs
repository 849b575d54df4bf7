//! Entity schema definitions.
//!
//! Entities are the records the canvas store owns. The engine only ever reads
//! them, so every type here is plain data with serde derives matching the
//! snapshot wire shape (`{ "id", "type", "transform", "props" }`).

use core::fmt;

use dw_core::{EntityId, Length, Real, ft, inch};
use serde::{Deserialize, Serialize};

/// On-disk snapshot document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotFile {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// Placement of an entity on the canvas. `rotation` is in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub x: Real,
    pub y: Real,
    #[serde(default)]
    pub rotation: Real,
    #[serde(default = "default_scale")]
    pub scale_x: Real,
    #[serde(default = "default_scale")]
    pub scale_y: Real,
}

fn default_scale() -> Real {
    1.0
}

impl Transform {
    pub fn at(x: Real, y: Real, rotation: Real) -> Self {
        Self {
            x,
            y,
            rotation,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.rotation, self.scale_x, self.scale_y]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(0.0, 0.0, 0.0)
    }
}

/// Discriminant of [`Entity`], used wherever only the type matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Room,
    Duct,
    Fitting,
    Equipment,
    Accessory,
    Note,
    Group,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Room => "room",
            EntityKind::Duct => "duct",
            EntityKind::Fitting => "fitting",
            EntityKind::Equipment => "equipment",
            EntityKind::Accessory => "accessory",
            EntityKind::Note => "note",
            EntityKind::Group => "group",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Room(Room),
    Duct(Duct),
    Fitting(Fitting),
    Equipment(Equipment),
    Accessory(Accessory),
    Note(Note),
    Group(Group),
}

impl Entity {
    pub fn id(&self) -> &EntityId {
        match self {
            Entity::Room(e) => &e.id,
            Entity::Duct(e) => &e.id,
            Entity::Fitting(e) => &e.id,
            Entity::Equipment(e) => &e.id,
            Entity::Accessory(e) => &e.id,
            Entity::Note(e) => &e.id,
            Entity::Group(e) => &e.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Room(_) => EntityKind::Room,
            Entity::Duct(_) => EntityKind::Duct,
            Entity::Fitting(_) => EntityKind::Fitting,
            Entity::Equipment(_) => EntityKind::Equipment,
            Entity::Accessory(_) => EntityKind::Accessory,
            Entity::Note(_) => EntityKind::Note,
            Entity::Group(_) => EntityKind::Group,
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            Entity::Room(e) => &e.transform,
            Entity::Duct(e) => &e.transform,
            Entity::Fitting(e) => &e.transform,
            Entity::Equipment(e) => &e.transform,
            Entity::Accessory(e) => &e.transform,
            Entity::Note(e) => &e.transform,
            Entity::Group(e) => &e.transform,
        }
    }

    /// Downstream relation declared by the entity, if it can carry one.
    pub fn connected_to(&self) -> Option<&EntityId> {
        match self {
            Entity::Duct(e) => e.props.connected_to.as_ref(),
            Entity::Fitting(e) => e.props.connected_to.as_ref(),
            Entity::Equipment(e) => e.props.connected_to.as_ref(),
            Entity::Accessory(e) => e.props.connected_to.as_ref(),
            Entity::Room(_) | Entity::Note(_) | Entity::Group(_) => None,
        }
    }

    pub fn connected_from(&self) -> Option<&EntityId> {
        match self {
            Entity::Duct(e) => e.props.connected_from.as_ref(),
            Entity::Fitting(e) => e.props.connected_from.as_ref(),
            Entity::Equipment(e) => e.props.connected_from.as_ref(),
            Entity::Accessory(e) => e.props.connected_from.as_ref(),
            Entity::Room(_) | Entity::Note(_) | Entity::Group(_) => None,
        }
    }

    pub fn system_type(&self) -> Option<&str> {
        match self {
            Entity::Duct(e) => e.props.system_type.as_deref(),
            Entity::Fitting(e) => e.props.system_type.as_deref(),
            Entity::Equipment(e) => e.props.system_type.as_deref(),
            _ => None,
        }
    }

    pub fn as_duct(&self) -> Option<&Duct> {
        match self {
            Entity::Duct(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_equipment(&self) -> Option<&Equipment> {
        match self {
            Entity::Equipment(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Ducts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuctShape {
    Round,
    Rectangular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuctMaterial {
    #[default]
    Galvanized,
    Stainless,
    Aluminum,
    Flex,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Duct {
    pub id: EntityId,
    #[serde(default)]
    pub transform: Transform,
    pub props: DuctProps,
}

/// Duct properties. Sizes are in inches, `length` in feet, `airflow` in CFM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DuctProps {
    #[serde(default)]
    pub name: String,
    pub shape: DuctShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Real>,
    pub length: Real,
    #[serde(default)]
    pub material: DuctMaterial,
    #[serde(default)]
    pub airflow: Real,
    #[serde(default)]
    pub static_pressure: Real,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_from: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_to: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_type: Option<String>,
}

impl DuctProps {
    /// A round duct with the given diameter (inches) and length (feet).
    pub fn round(diameter: Real, length: Real) -> Self {
        Self {
            name: String::new(),
            shape: DuctShape::Round,
            diameter: Some(diameter),
            width: None,
            height: None,
            length,
            material: DuctMaterial::Galvanized,
            airflow: 0.0,
            static_pressure: 0.0,
            connected_from: None,
            connected_to: None,
            system_type: None,
        }
    }

    /// A rectangular duct with width/height (inches) and length (feet).
    pub fn rectangular(width: Real, height: Real, length: Real) -> Self {
        Self {
            shape: DuctShape::Rectangular,
            diameter: None,
            width: Some(width),
            height: Some(height),
            ..Self::round(0.0, length)
        }
    }
}

impl Duct {
    pub fn new(id: impl Into<EntityId>, transform: Transform, props: DuctProps) -> Self {
        Self {
            id: id.into(),
            transform,
            props,
        }
    }

    pub fn length(&self) -> Length {
        ft(self.props.length)
    }

    /// Nominal size used to compare two ducts at a joint.
    ///
    /// Round ducts report their diameter; rectangular ducts report the
    /// equivalent round diameter `1.3 (wh)^0.625 / (w + h)^0.25`. Returns `None`
    /// when the shape's dimensions are missing or non-positive.
    pub fn nominal_size(&self) -> Option<Length> {
        let size = match self.props.shape {
            DuctShape::Round => self.props.diameter?,
            DuctShape::Rectangular => {
                let (w, h) = (self.props.width?, self.props.height?);
                1.3 * (w * h).powf(0.625) / (w + h).powf(0.25)
            }
        };
        (size.is_finite() && size > 0.0).then(|| inch(size))
    }
}

// ---------------------------------------------------------------------------
// Fittings, equipment, accessories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FittingType {
    Elbow,
    Tee,
    Cross,
    Transition,
}

impl fmt::Display for FittingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FittingType::Elbow => "elbow",
            FittingType::Tee => "tee",
            FittingType::Cross => "cross",
            FittingType::Transition => "transition",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fitting {
    pub id: EntityId,
    #[serde(default)]
    pub transform: Transform,
    pub props: FittingProps,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FittingProps {
    pub fitting_type: FittingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlet_duct_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_duct_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_from: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_to: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Hood,
    Fan,
    Diffuser,
    Damper,
    Ahu,
}

impl EquipmentType {
    /// Demand-side devices whose rated capacity seeds airflow accumulation.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EquipmentType::Diffuser | EquipmentType::Hood | EquipmentType::Damper
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentType::Hood => "hood",
            EquipmentType::Fan => "fan",
            EquipmentType::Diffuser => "diffuser",
            EquipmentType::Damper => "damper",
            EquipmentType::Ahu => "ahu",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Equipment {
    pub id: EntityId,
    #[serde(default)]
    pub transform: Transform,
    pub props: EquipmentProps,
}

/// Equipment properties. `capacity` is the rated airflow in CFM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentProps {
    #[serde(default)]
    pub name: String,
    pub equipment_type: EquipmentType,
    pub capacity: Real,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_from: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_to: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_type: Option<String>,
}

impl Equipment {
    pub fn is_terminal(&self) -> bool {
        self.props.equipment_type.is_terminal()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Accessory {
    pub id: EntityId,
    #[serde(default)]
    pub transform: Transform,
    pub props: AccessoryProps,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryProps {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_from: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_to: Option<EntityId>,
}

// ---------------------------------------------------------------------------
// Non-flow entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: EntityId,
    #[serde(default)]
    pub transform: Transform,
    pub props: RoomProps,
}

/// Room footprint in feet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomProps {
    #[serde(default)]
    pub name: String,
    pub width: Real,
    pub length: Real,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling_height: Option<Real>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: EntityId,
    #[serde(default)]
    pub transform: Transform,
    pub props: NoteProps,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteProps {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: EntityId,
    #[serde(default)]
    pub transform: Transform,
    pub props: GroupProps,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupProps {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub child_ids: Vec<EntityId>,
}
