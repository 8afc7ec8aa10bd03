// ============================================
// src/house.rs
// 出題データ（家）と、選択肢・回答の型
// ============================================

use std::fmt;

use serde::{Deserialize, Deserializer};

/// ベッド数の選択肢（表示順）
pub const BED_OPTIONS: [u8; 4] = [0, 1, 2, 4];
/// チェストの選択肢（表示順）
pub const CHEST_OPTIONS: [Chest; 4] = [Chest::None, Chest::Emerald, Chest::Bucket, Chest::Iron];
/// 作業台の選択肢。「なし」が先
pub const CRAFT_OPTIONS: [bool; 2] = [false, true];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chest {
    None,
    Emerald,
    Bucket,
    Iron,
}

impl Chest {
    pub fn key(self) -> &'static str {
        match self {
            Chest::None => "none",
            Chest::Emerald => "emerald",
            Chest::Bucket => "bucket",
            Chest::Iron => "iron",
        }
    }
}

/// 1問分のデータ
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct House {
    pub image: String,
    pub name: String,
    #[serde(deserialize_with = "deserialize_beds")]
    pub beds: u8,
    pub chest: Chest,
    /// 砂漠のデータにだけ入っている
    #[serde(default)]
    pub craft: Option<bool>,
}

fn deserialize_beds<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let beds = u8::deserialize(deserializer)?;
    if BED_OPTIONS.contains(&beds) {
        Ok(beds)
    } else {
        Err(serde::de::Error::custom(format!(
            "beds must be one of {:?}, got {}",
            BED_OPTIONS, beds
        )))
    }
}

/// 回答する属性の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Beds,
    Chest,
    Craft,
}

impl AttrKind {
    pub fn label(self) -> &'static str {
        match self {
            AttrKind::Beds => "Beds",
            AttrKind::Chest => "Chest",
            AttrKind::Craft => "Crafting Table",
        }
    }

    /// この行に並ぶ選択肢
    pub fn options(self) -> Vec<Pick> {
        match self {
            AttrKind::Beds => BED_OPTIONS.iter().map(|n| Pick::Beds(*n)).collect(),
            AttrKind::Chest => CHEST_OPTIONS.iter().map(|c| Pick::Chest(*c)).collect(),
            AttrKind::Craft => CRAFT_OPTIONS.iter().map(|f| Pick::Craft(*f)).collect(),
        }
    }
}

/// 選択肢ひとつ（属性と値の組）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pick {
    Beds(u8),
    Chest(Chest),
    Craft(bool),
}

impl Pick {
    pub fn kind(self) -> AttrKind {
        match self {
            Pick::Beds(_) => AttrKind::Beds,
            Pick::Chest(_) => AttrKind::Chest,
            Pick::Craft(_) => AttrKind::Craft,
        }
    }

    /// アイコン画像のパス
    pub fn icon_path(self) -> String {
        match self {
            Pick::Beds(n) => format!("assets/icons/beds_{}.png", n),
            Pick::Chest(c) => format!("assets/icons/chest_{}.png", c.key()),
            Pick::Craft(flag) => {
                format!("assets/icons/craft_{}.png", if flag { "yes" } else { "no" })
            }
        }
    }
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pick::Beds(n) => write!(f, "{} beds", n),
            Pick::Chest(c) => write!(f, "{} chest", c.key()),
            Pick::Craft(true) => f.write_str("Yes"),
            Pick::Craft(false) => f.write_str("No"),
        }
    }
}

impl House {
    /// 正解の値。作業台がデータにない家は None
    pub fn answer(&self, kind: AttrKind) -> Option<Pick> {
        match kind {
            AttrKind::Beds => Some(Pick::Beds(self.beds)),
            AttrKind::Chest => Some(Pick::Chest(self.chest)),
            AttrKind::Craft => self.craft.map(Pick::Craft),
        }
    }
}

/// ユーザーの仮回答
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Picks {
    pub beds: Option<u8>,
    pub chest: Option<Chest>,
    pub craft: Option<bool>,
}

impl Picks {
    pub fn set(&mut self, pick: Pick) {
        match pick {
            Pick::Beds(n) => self.beds = Some(n),
            Pick::Chest(c) => self.chest = Some(c),
            Pick::Craft(flag) => self.craft = Some(flag),
        }
    }

    pub fn get(&self, kind: AttrKind) -> Option<Pick> {
        match kind {
            AttrKind::Beds => self.beds.map(Pick::Beds),
            AttrKind::Chest => self.chest.map(Pick::Chest),
            AttrKind::Craft => self.craft.map(Pick::Craft),
        }
    }

    pub fn is_picked(&self, pick: Pick) -> bool {
        self.get(pick.kind()) == Some(pick)
    }
}
