//! Domain enumerations shared by the db layer, GraphQL schema, and
//! import/export formats.
//!
//! Every enum uses its SCREAMING_SNAKE_CASE wire form for GraphQL,
//! JSON import/export, and TEXT storage in SQLite, so one string
//! representation round-trips through all three.

use async_graphql::Enum;
use serde::{Deserialize, Serialize};

/// Wine style category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WineType {
    Red,
    White,
    Rose,
    Sparkling,
    Dessert,
    Fortified,
    Orange,
}

impl WineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WineType::Red => "RED",
            WineType::White => "WHITE",
            WineType::Rose => "ROSE",
            WineType::Sparkling => "SPARKLING",
            WineType::Dessert => "DESSERT",
            WineType::Fortified => "FORTIFIED",
            WineType::Orange => "ORANGE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RED" => Some(WineType::Red),
            "WHITE" => Some(WineType::White),
            "ROSE" => Some(WineType::Rose),
            "SPARKLING" => Some(WineType::Sparkling),
            "DESSERT" => Some(WineType::Dessert),
            "FORTIFIED" => Some(WineType::Fortified),
            "ORANGE" => Some(WineType::Orange),
            _ => None,
        }
    }
}

/// Residual sugar classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sweetness {
    BoneDry,
    Dry,
    OffDry,
    MediumSweet,
    Sweet,
}

impl Sweetness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sweetness::BoneDry => "BONE_DRY",
            Sweetness::Dry => "DRY",
            Sweetness::OffDry => "OFF_DRY",
            Sweetness::MediumSweet => "MEDIUM_SWEET",
            Sweetness::Sweet => "SWEET",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BONE_DRY" => Some(Sweetness::BoneDry),
            "DRY" => Some(Sweetness::Dry),
            "OFF_DRY" => Some(Sweetness::OffDry),
            "MEDIUM_SWEET" => Some(Sweetness::MediumSweet),
            "SWEET" => Some(Sweetness::Sweet),
            _ => None,
        }
    }
}

/// Bottle format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BottleSize {
    Split,
    Half,
    Standard,
    Magnum,
    DoubleMagnum,
    Jeroboam,
}

impl BottleSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            BottleSize::Split => "SPLIT",
            BottleSize::Half => "HALF",
            BottleSize::Standard => "STANDARD",
            BottleSize::Magnum => "MAGNUM",
            BottleSize::DoubleMagnum => "DOUBLE_MAGNUM",
            BottleSize::Jeroboam => "JEROBOAM",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SPLIT" => Some(BottleSize::Split),
            "HALF" => Some(BottleSize::Half),
            "STANDARD" => Some(BottleSize::Standard),
            "MAGNUM" => Some(BottleSize::Magnum),
            "DOUBLE_MAGNUM" => Some(BottleSize::DoubleMagnum),
            "JEROBOAM" => Some(BottleSize::Jeroboam),
            _ => None,
        }
    }
}

/// Inventory status of a wine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WineStatus {
    InCellar,
    Consumed,
    Gifted,
    Sold,
}

impl WineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WineStatus::InCellar => "IN_CELLAR",
            WineStatus::Consumed => "CONSUMED",
            WineStatus::Gifted => "GIFTED",
            WineStatus::Sold => "SOLD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IN_CELLAR" => Some(WineStatus::InCellar),
            "CONSUMED" => Some(WineStatus::Consumed),
            "GIFTED" => Some(WineStatus::Gifted),
            "SOLD" => Some(WineStatus::Sold),
            _ => None,
        }
    }
}

/// What a photo depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoType {
    Label,
    Bottle,
    Cork,
    Pour,
    Other,
}

impl PhotoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoType::Label => "LABEL",
            PhotoType::Bottle => "BOTTLE",
            PhotoType::Cork => "CORK",
            PhotoType::Pour => "POUR",
            PhotoType::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LABEL" => Some(PhotoType::Label),
            "BOTTLE" => Some(PhotoType::Bottle),
            "CORK" => Some(PhotoType::Cork),
            "POUR" => Some(PhotoType::Pour),
            "OTHER" => Some(PhotoType::Other),
            _ => None,
        }
    }
}
